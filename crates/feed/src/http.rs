use kizashi_core::signal::entity::RawPayload;
use kizashi_core::signal::error::FetchError;
use reqwest::{Client, RequestBuilder, StatusCode};
use std::time::Duration;
use tracing::debug;

// 单次请求的客户端级超时，调度器另有更短的抓取超时
pub const CLIENT_TIMEOUT: Duration = Duration::from_secs(10);

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// # Summary
/// 构建共享的 HTTP 客户端。
///
/// # Logic
/// 1. 配置 10 秒超时。
/// 2. 设置浏览器 User-Agent，部分上游会拦截默认 UA。
///
/// # Returns
/// 构建失败 (TLS 提供者未安装等) 返回 `FetchError::Network`。
pub fn build_client() -> Result<Client, FetchError> {
    Client::builder()
        .timeout(CLIENT_TIMEOUT)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| FetchError::Network(e.to_string()))
}

/// # Summary
/// 发送请求并把响应体读取为 JSON。
///
/// # Logic
/// 1. 传输层超时映射为 `Timeout`，其余传输错误映射为 `Network`。
/// 2. 401/403 映射为 `Auth`，其他非成功状态映射为 `Status`。
/// 3. 响应体不是合法 JSON 时映射为 `Decode`。
pub async fn send_json(request: RequestBuilder) -> Result<RawPayload, FetchError> {
    let resp = request.send().await.map_err(map_transport)?;
    let status = resp.status();
    debug!("{} -> {}", resp.url().path(), status);

    check_status(status)?;
    resp.json::<RawPayload>()
        .await
        .map_err(|e| FetchError::Decode(e.to_string()))
}

fn map_transport(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout(CLIENT_TIMEOUT)
    } else {
        FetchError::Network(e.to_string())
    }
}

/// 将 HTTP 状态码归入错误分类
pub fn check_status(status: StatusCode) -> Result<(), FetchError> {
    match status {
        s if s.is_success() => Ok(()),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            Err(FetchError::Auth(format!("HTTP {}", status.as_u16())))
        }
        s => Err(FetchError::Status(s.as_u16())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert!(check_status(StatusCode::OK).is_ok());
        assert!(matches!(
            check_status(StatusCode::FORBIDDEN),
            Err(FetchError::Auth(_))
        ));
        assert_eq!(
            check_status(StatusCode::TOO_MANY_REQUESTS),
            Err(FetchError::Status(429))
        );
    }
}
