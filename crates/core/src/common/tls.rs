/// # Summary
/// 安装进程级的 rustls 加密后端 (ring)。
///
/// # Logic
/// 1. 各 HTTP 适配器使用 `rustls-no-provider`，必须在首个 TLS 连接前完成安装。
/// 2. 重复安装返回 Err，此处视为已安装并忽略。
pub fn install_crypto_provider() {
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        tracing::trace!("rustls crypto provider already installed");
    }
}
