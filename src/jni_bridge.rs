//! JNI exports for the Android host
//!
//! Mirrors the small surface the Kotlin side binds against. Heavy lifting
//! stays in the crate modules; these functions only marshal strings.

use jni::objects::{JClass, JString};
use jni::sys::jstring;
use jni::JNIEnv;

fn to_jstring(env: &mut JNIEnv, value: &str) -> jstring {
    env.new_string(value)
        .map(|s| s.into_raw())
        .unwrap_or(std::ptr::null_mut())
}

#[no_mangle]
pub extern "system" fn Java_com_office701_articapital_ShareCore_coreVersion(
    mut env: JNIEnv,
    _class: JClass,
) -> jstring {
    to_jstring(&mut env, env!("CARGO_PKG_VERSION"))
}

#[no_mangle]
pub extern "system" fn Java_com_office701_articapital_ShareCore_mimeTypeFor(
    mut env: JNIEnv,
    _class: JClass,
    file_name: JString,
) -> jstring {
    let file_name: String = match env.get_string(&file_name) {
        Ok(s) => s.into(),
        Err(_) => return std::ptr::null_mut(),
    };
    to_jstring(&mut env, crate::file::infer_mime_type(&file_name))
}

#[no_mangle]
pub extern "system" fn Java_com_office701_articapital_ShareCore_handoffUrl(
    mut env: JNIEnv,
    _class: JClass,
    bundle_id: JString,
) -> jstring {
    let bundle_id: String = match env.get_string(&bundle_id) {
        Ok(s) => s.into(),
        Err(_) => return std::ptr::null_mut(),
    };
    to_jstring(&mut env, &crate::storage::handoff_url(&bundle_id))
}
