use crate::utils::error::Result;
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn default_filter(verbose: bool) -> EnvFilter {
    if verbose {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("racecards_dash=debug,info"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("racecards_dash=info"))
    }
}

/// 單次模式：日誌寫到 stderr，stdout 留給結果
pub fn init_cli_logger(verbose: bool) {
    tracing_subscriber::registry()
        .with(default_filter(verbose))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .init();
}

/// 互動模式：終端機被 TUI 佔用，只能寫檔；沒有指定檔案就不輸出
pub fn init_tui_logger(verbose: bool, log_file: Option<&Path>, json: bool) -> Result<()> {
    let Some(path) = log_file else {
        return Ok(());
    };

    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let layer = tracing_subscriber::fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .with_thread_ids(false);

    if json {
        tracing_subscriber::registry()
            .with(default_filter(verbose))
            .with(layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(default_filter(verbose))
            .with(layer.compact())
            .init();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::{ErrorCategory, RacecardError};

    #[test]
    fn test_tui_logger_without_file_is_noop() {
        assert!(init_tui_logger(false, None, false).is_ok());
    }

    #[test]
    fn test_tui_logger_unwritable_path_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("racecards.log");
        let err = init_tui_logger(false, Some(&path), false).unwrap_err();
        assert!(matches!(err, RacecardError::IoError(_)));
        assert_eq!(err.category(), ErrorCategory::Unexpected);
    }
}
