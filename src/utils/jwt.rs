//! Access Token 校验
//!
//! 令牌由认证服务签发，这里只负责验证签名、有效期和令牌类型。

use crate::config::AppConfig;
use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

// JWT Claims 结构体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,        // Subject (user ID)
    pub role: String,       // 用户角色
    pub token_type: String, // token类型: "access" 或 "refresh"
    pub exp: usize,         // Expiration time (时间戳)
    pub iat: usize,         // Issued at (签发时间)
}

impl Claims {
    pub fn user_id(&self) -> Option<i64> {
        self.sub.parse().ok()
    }
}

pub struct JwtUtils;

impl JwtUtils {
    // 验证 Access Token（使用配置中的密钥）
    pub fn verify_access_token(token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        Self::verify_access_token_with_secret(token, &AppConfig::get().jwt.secret)
    }

    // 使用指定密钥验证 Access Token
    pub fn verify_access_token_with_secret(
        token: &str,
        secret: &str,
    ) -> Result<Claims, jsonwebtoken::errors::Error> {
        let decoding_key = DecodingKey::from_secret(secret.as_ref());
        let validation = Validation::default();

        let claims = decode::<Claims>(token, &decoding_key, &validation)
            .map(|token_data| token_data.claims)?;

        if claims.token_type != "access" {
            return Err(jsonwebtoken::errors::Error::from(
                jsonwebtoken::errors::ErrorKind::InvalidToken,
            ));
        }
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header, encode};

    fn sign(token_type: &str, secret: &str, expires_in: i64) -> String {
        let now = chrono::Utc::now();
        let claims = Claims {
            sub: "42".to_string(),
            role: "teacher".to_string(),
            token_type: token_type.to_string(),
            exp: (now + chrono::Duration::seconds(expires_in)).timestamp() as usize,
            iat: now.timestamp() as usize,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_ref()),
        )
        .unwrap()
    }

    #[test]
    fn accepts_valid_access_token() {
        let token = sign("access", "secret", 600);
        let claims = JwtUtils::verify_access_token_with_secret(&token, "secret").unwrap();
        assert_eq!(claims.user_id(), Some(42));
        assert_eq!(claims.role, "teacher");
    }

    #[test]
    fn rejects_refresh_token_and_wrong_secret() {
        let refresh = sign("refresh", "secret", 600);
        assert!(JwtUtils::verify_access_token_with_secret(&refresh, "secret").is_err());

        let access = sign("access", "secret", 600);
        assert!(JwtUtils::verify_access_token_with_secret(&access, "other").is_err());
    }

    #[test]
    fn rejects_expired_token() {
        let token = sign("access", "secret", -3600);
        assert!(JwtUtils::verify_access_token_with_secret(&token, "secret").is_err());
    }
}
