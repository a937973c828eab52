//! `log_*!` 宏的输出端

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Warn,
    Error,
}

/// wasm32 下写入浏览器控制台，其他平台写入 stdout/stderr
pub fn emit(level: Level, message: &str) {
    #[cfg(target_arch = "wasm32")]
    {
        match level {
            Level::Info => web_sys::console::log_1(&message.into()),
            Level::Warn => web_sys::console::warn_1(&message.into()),
            Level::Error => web_sys::console::error_1(&message.into()),
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    match level {
        Level::Info => println!("{}", message),
        Level::Warn | Level::Error => eprintln!("{}", message),
    }
}
