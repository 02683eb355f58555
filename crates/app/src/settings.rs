use config::{Config, Environment, File};
use kizashi_core::config::{AppConfig, ConfigError};

/// 指定额外配置文件路径的环境变量
pub const CONFIG_PATH_ENV: &str = "KIZASHI_CONFIG";

/// # Summary
/// 按层叠顺序加载配置并校验。
///
/// # Logic
/// 1. `config/default.toml` (可选)。
/// 2. `extra` 指定的文件 (若给出则必须存在)。
/// 3. `KIZASHI__` 前缀环境变量，层级以 `__` 分隔，如 `KIZASHI__SCANNER__INTERVAL_SECS`。
/// 4. 反序列化为 `AppConfig`，缺失字段取默认值，再执行 `validate`。
///
/// # Arguments
/// * `extra`: 通常来自 `KIZASHI_CONFIG`。
pub fn load(extra: Option<&str>) -> Result<AppConfig, ConfigError> {
    let mut builder =
        Config::builder().add_source(File::with_name("config/default").required(false));
    if let Some(path) = extra {
        builder = builder.add_source(File::with_name(path).required(true));
    }
    builder = builder.add_source(
        Environment::with_prefix("KIZASHI")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("scanner.watchlist")
            .with_list_parse_key("sources.macro_countries"),
    );

    let config: AppConfig = builder
        .build()
        .and_then(Config::try_deserialize)
        .map_err(|e| ConfigError::Load(e.to_string()))?;
    config.validate()?;
    Ok(config)
}
