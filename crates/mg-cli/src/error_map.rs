use mg_core::MapgenError;
use std::fmt::Display;

fn map_error(code: &'static str, error: impl Display) -> MapgenError {
    MapgenError::host(code, error.to_string())
}

pub(crate) fn emit_error(error: MapgenError) -> i32 {
    println!("RESULT:ERROR");
    println!("ERROR_CODE:{}", error.code());
    println!(
        "ERROR_MSG_JSON:{}",
        serde_json::to_string(&error.to_string())
            .unwrap_or_else(|_| "\"Unknown error\"".to_string())
    );
    1
}

pub(crate) fn map_cli_cwd(error: std::io::Error) -> MapgenError {
    map_error("CLI_CWD", error)
}

pub(crate) fn map_cli_export_write(error: std::io::Error) -> MapgenError {
    map_error("CLI_EXPORT_WRITE", error)
}

pub(crate) fn map_cli_export_encode(error: serde_json::Error) -> MapgenError {
    map_error("CLI_EXPORT_ENCODE", error)
}

#[cfg(test)]
mod error_map_tests {
    use super::*;

    #[test]
    fn emit_error_returns_non_zero_exit_code() {
        let code = emit_error(MapgenError::LibraryNotFound {
            path: "globalscripts".to_string(),
        });
        assert_eq!(code, 1);
    }

    #[test]
    fn mapping_helpers_keep_error_codes() {
        assert_eq!(map_cli_cwd(std::io::Error::other("cwd")).code(), "CLI_CWD");
        assert_eq!(
            map_cli_export_write(std::io::Error::other("write")).code(),
            "CLI_EXPORT_WRITE"
        );

        let invalid = serde_json::from_str::<serde_json::Value>("{").expect_err("invalid json");
        assert_eq!(map_cli_export_encode(invalid).code(), "CLI_EXPORT_ENCODE");
    }
}
