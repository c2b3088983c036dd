use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

use crate::config::AdminConfig;
use crate::error::{AppError, AppResult};
use crate::models::{AdminIdentity, LoginRequest};
use crate::utils::{JwtService, verify_admin_password};

pub const SESSION_COOKIE: &str = "admin_session";

/// 管理员会话
/// - 登录成功后生成 session id，登记到内存会话表并签发令牌
/// - 令牌校验需同时满足签名有效、未过期、session id 仍在会话表中
/// - 登出即从会话表删除
#[derive(Clone)]
pub struct AuthService {
    admin: AdminConfig,
    jwt_service: JwtService,
    sessions: Arc<RwLock<HashMap<String, DateTime<Utc>>>>,
}

impl AuthService {
    pub fn new(admin: AdminConfig) -> Self {
        let jwt_service = JwtService::new(&admin.session_secret, admin.session_ttl_secs);
        Self {
            admin,
            jwt_service,
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn session_ttl_secs(&self) -> i64 {
        self.jwt_service.expires_in()
    }

    pub fn secure_cookie(&self) -> bool {
        self.admin.secure_cookie
    }

    /// 登录，返回 (令牌, 身份)
    pub fn login(&self, request: &LoginRequest) -> AppResult<(String, AdminIdentity)> {
        let username_ok = request.username == self.admin.username;
        let password_ok = verify_admin_password(&request.password, &self.admin.password)?;
        if !username_ok || !password_ok {
            log::warn!("Failed admin login for user {}", request.username);
            return Err(AppError::AuthError("Invalid username or password".into()));
        }

        let session_id = Uuid::new_v4().to_string();
        let token = self
            .jwt_service
            .generate_session_token(&self.admin.username, &session_id)?;

        let now = Utc::now();
        {
            let mut sessions = self.write_sessions()?;
            // 顺带清理过期会话
            sessions.retain(|_, expires_at| *expires_at > now);
            sessions.insert(
                session_id.clone(),
                now + Duration::seconds(self.session_ttl_secs()),
            );
        }

        log::info!("Admin {} logged in", self.admin.username);
        Ok((
            token,
            AdminIdentity {
                username: self.admin.username.clone(),
                session_id,
            },
        ))
    }

    /// 校验会话令牌
    pub fn verify(&self, token: &str) -> AppResult<AdminIdentity> {
        let claims = self.jwt_service.verify_session_token(token)?;

        let sessions = self
            .sessions
            .read()
            .map_err(|_| AppError::InternalError("session table poisoned".into()))?;
        match sessions.get(&claims.sid) {
            Some(expires_at) if *expires_at > Utc::now() => Ok(AdminIdentity {
                username: claims.sub,
                session_id: claims.sid,
            }),
            _ => Err(AppError::Unauthorized),
        }
    }

    /// 登出；令牌无效时静默忽略
    pub fn logout(&self, token: &str) -> AppResult<()> {
        if let Ok(claims) = self.jwt_service.verify_session_token(token) {
            self.write_sessions()?.remove(&claims.sid);
            log::info!("Admin {} logged out", claims.sub);
        }
        Ok(())
    }

    fn write_sessions(
        &self,
    ) -> AppResult<std::sync::RwLockWriteGuard<'_, HashMap<String, DateTime<Utc>>>> {
        self.sessions
            .write()
            .map_err(|_| AppError::InternalError("session table poisoned".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> AuthService {
        AuthService::new(AdminConfig {
            username: "admin".into(),
            password: "secret".into(),
            session_secret: "test-secret".into(),
            session_ttl_secs: 86_400,
            secure_cookie: false,
        })
    }

    fn login(username: &str, password: &str) -> LoginRequest {
        LoginRequest {
            username: username.into(),
            password: password.into(),
        }
    }

    #[test]
    fn test_login_verify_logout() {
        let auth = service();
        let (token, identity) = auth.login(&login("admin", "secret")).unwrap();
        assert_eq!(auth.verify(&token).unwrap(), identity);

        auth.logout(&token).unwrap();
        assert!(matches!(auth.verify(&token), Err(AppError::Unauthorized)));
    }

    #[test]
    fn test_wrong_credentials() {
        let auth = service();
        assert!(matches!(
            auth.login(&login("admin", "nope")),
            Err(AppError::AuthError(_))
        ));
        assert!(auth.login(&login("root", "secret")).is_err());
    }

    #[test]
    fn test_token_from_other_instance_is_rejected() {
        // 签名有效但会话不在本进程会话表中
        let (token, _) = service().login(&login("admin", "secret")).unwrap();
        assert!(service().verify(&token).is_err());
        assert!(service().verify("garbage").is_err());
    }
}
