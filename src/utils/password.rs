use bcrypt::verify;
use crate::error::{AppError, AppResult};

/// 是否为 bcrypt 哈希
fn is_bcrypt_hash(value: &str) -> bool {
    ["$2a$", "$2b$", "$2y$"].iter().any(|p| value.starts_with(p))
}

/// 校验管理员密码
/// 配置值为 bcrypt 哈希时按哈希校验，否则按明文比较
pub fn verify_admin_password(password: &str, configured: &str) -> AppResult<bool> {
    if is_bcrypt_hash(configured) {
        return verify(password, configured)
            .map_err(|e| AppError::InternalError(format!("Password verification failed: {e}")));
    }
    Ok(constant_time_eq(password.as_bytes(), configured.as_bytes()))
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
