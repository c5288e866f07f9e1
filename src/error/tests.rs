// armada: Multi-Repository Git Operation Orchestrator
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use super::{ArmadaError, ArmadaResult, ConfigError, OpError};

#[test]
fn test_config_error_display() {
    let err = ConfigError::MissingKey {
        section: "git".to_string(),
        key: "executable".to_string(),
    };
    assert_eq!(
        err.to_string(),
        "missing required config key 'executable' in section '[git]'"
    );
}

#[test]
fn test_op_error_display() {
    let err = OpError::InvalidSpec {
        reason: "2 repositories have a suspended rebase".to_string(),
    };
    assert_eq!(
        err.to_string(),
        "invalid operation spec: 2 repositories have a suspended rebase"
    );
}

#[test]
fn test_armada_error_size() {
    // ArmadaError should be reasonably small
    // Box<str> variants (Bailed, Other) are 16 bytes (fat pointer: ptr + len)
    // With discriminant + alignment = 24 bytes
    let size = std::mem::size_of::<ArmadaError>();
    assert!(size <= 24, "ArmadaError is {size} bytes, expected <= 24");
}

#[test]
fn test_armada_result_size() {
    // Result<(), ArmadaError> should be reasonably small
    let size = std::mem::size_of::<ArmadaResult<()>>();
    assert!(size <= 24, "ArmadaResult<()> is {size} bytes, expected <= 24");
}

#[test]
fn test_sub_errors_box_into_top_level() {
    let err: ArmadaError = OpError::SaveFailed {
        root: "backend".to_string(),
        message: "stash failed".to_string(),
    }
    .into();
    assert!(matches!(err, ArmadaError::Op(_)));
    assert!(err.to_string().contains("backend"));
}
