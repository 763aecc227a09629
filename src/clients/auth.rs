//! Google Cloud 服务账号认证
//!
//! 读取操作者提供的服务账号 JSON 文件，用 RSA 私钥签发 JWT，
//! 再向令牌端点换取访问令牌

use crate::error::{AppError, AppResult};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

const CLOUD_VISION_SCOPE: &str = "https://www.googleapis.com/auth/cloud-vision";

/// 服务账号凭证（服务账号 JSON 文件的关键字段）
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountCredentials {
    pub client_email: String,
    pub private_key: String,
    pub token_uri: String,
}

/// JWT 声明
#[derive(Debug, Serialize)]
struct Claims {
    iss: String,
    scope: String,
    aud: String,
    exp: u64,
    iat: u64,
}

/// 令牌端点响应
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[allow(dead_code)]
    expires_in: u64,
    #[allow(dead_code)]
    token_type: String,
}

/// 从文件加载服务账号凭证
pub fn load_credentials(path: impl AsRef<Path>) -> AppResult<ServiceAccountCredentials> {
    let path = path.as_ref();
    let data = std::fs::read(path).map_err(|e| AppError::file(path.display().to_string(), e))?;
    serde_json::from_slice(&data)
        .map_err(|e| AppError::Validation(format!("凭证文件解析失败 ({}): {}", path.display(), e)))
}

/// 用服务账号凭证换取访问令牌
pub async fn get_access_token(credentials: &ServiceAccountCredentials) -> AppResult<String> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| AppError::Api(format!("系统时间异常: {}", e)))?
        .as_secs();

    let claims = Claims {
        iss: credentials.client_email.clone(),
        scope: CLOUD_VISION_SCOPE.to_string(),
        aud: credentials.token_uri.clone(),
        exp: now + 3600,
        iat: now,
    };

    // RSA 私钥签名 JWT
    let key = EncodingKey::from_rsa_pem(credentials.private_key.as_bytes())
        .map_err(|e| AppError::Api(format!("RSA 私钥解析失败: {}", e)))?;
    let jwt = encode(&Header::new(Algorithm::RS256), &claims, &key)
        .map_err(|e| AppError::Api(format!("JWT 生成失败: {}", e)))?;

    // 向令牌端点换取访问令牌
    let client = reqwest::Client::new();
    let response = client
        .post(&credentials.token_uri)
        .form(&[
            ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
            ("assertion", &jwt),
        ])
        .send()
        .await
        .map_err(|e| AppError::Api(format!("令牌请求失败: {}", e)))?;

    let token_response: TokenResponse = response
        .json()
        .await
        .map_err(|e| AppError::Api(format!("令牌响应解析失败: {}", e)))?;

    Ok(token_response.access_token)
}
