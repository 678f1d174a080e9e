// /////////////////////////////////////////////////////////////////////////////
// Adaptive Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Exit Codes
//!
//! Maps a `harness_domain::error::HarnessError` to a Unix-style process exit
//! code (sysexits.h conventions) so `main` can translate a top-level
//! `Result` into `std::process::ExitCode` without matching on error variants
//! itself.

use harness_domain::error::HarnessError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    Ok = 0,
    GeneralError = 1,
    Usage = 64,
    DataErr = 65,
    NoInput = 66,
    Unavailable = 69,
    Config = 78,
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        std::process::ExitCode::from(code as u8)
    }
}

pub fn map_error_to_exit_code(error: &HarnessError) -> ExitCode {
    match error {
        HarnessError::InvalidPatch { .. }
        | HarnessError::InvalidSpec(_)
        | HarnessError::InvalidInput(_) => ExitCode::DataErr,
        HarnessError::MissingRequired(_) | HarnessError::Misconfigured(_) => ExitCode::Config,
        HarnessError::NotFound(_) => ExitCode::NoInput,
        HarnessError::Duplicate(_) => ExitCode::DataErr,
        HarnessError::StageFailure(_) | HarnessError::ProtocolError(_) => ExitCode::Unavailable,
        HarnessError::DeadlockInternal(_) | HarnessError::CancelledBatch(_) => ExitCode::GeneralError,
        HarnessError::Io(_) => ExitCode::NoInput,
        HarnessError::Json(_) => ExitCode::DataErr,
    }
}

pub fn result_to_exit_code<T>(result: Result<T, HarnessError>) -> std::process::ExitCode {
    match result {
        Ok(_) => ExitCode::Ok.into(),
        Err(err) => {
            eprintln!("error: {err}");
            map_error_to_exit_code(&err).into()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_required_config_maps_to_config_exit_code() {
        let err = HarnessError::MissingRequired("api_key".to_string());
        assert_eq!(map_error_to_exit_code(&err), ExitCode::Config);
    }

    #[test]
    fn not_found_maps_to_no_input() {
        let err = HarnessError::NotFound("run abc".to_string());
        assert_eq!(map_error_to_exit_code(&err), ExitCode::NoInput);
    }
}
