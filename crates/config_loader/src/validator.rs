//! 配置校验模块
//!
//! 校验规则：
//! - polling_interval_ms > 0, max_ticks > 0 (if set)
//! - replay 路径与输出路径非空且互不相同
//! - sink name 非空
//! - trace 前缀非空且互不相同

use contracts::{AcquisitionBlueprint, ContractError, SinkType, SourceKind};

/// 校验 AcquisitionBlueprint 配置
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate(blueprint: &AcquisitionBlueprint) -> Result<(), ContractError> {
    validate_loop(blueprint)?;
    validate_paths(blueprint)?;
    validate_sink(blueprint)?;
    validate_trace(blueprint)?;
    Ok(())
}

/// 校验轮询周期
fn validate_loop(blueprint: &AcquisitionBlueprint) -> Result<(), ContractError> {
    let acquisition = &blueprint.acquisition;

    if acquisition.polling_interval_ms == 0 {
        return Err(ContractError::config_validation(
            "acquisition.polling_interval_ms",
            "polling_interval_ms must be > 0",
        ));
    }

    if acquisition.max_ticks == Some(0) {
        return Err(ContractError::config_validation(
            "acquisition.max_ticks",
            "max_ticks must be > 0 when set",
        ));
    }

    Ok(())
}

/// 校验输入/输出路径
fn validate_paths(blueprint: &AcquisitionBlueprint) -> Result<(), ContractError> {
    let replay = blueprint.source.kind == SourceKind::Replay;
    let csv = blueprint.sink.kind == SinkType::Csv;

    if replay && blueprint.source.path.as_os_str().is_empty() {
        return Err(ContractError::config_validation(
            "source.path",
            "replay source requires a log path",
        ));
    }

    if csv && blueprint.sink.path.as_os_str().is_empty() {
        return Err(ContractError::config_validation(
            "sink.path",
            "csv sink requires an output path",
        ));
    }

    // Appending records to the capture would corrupt the replay input
    if replay && csv && blueprint.source.path == blueprint.sink.path {
        return Err(ContractError::config_validation(
            "source.path / sink.path",
            format!(
                "output path '{}' must differ from the replay log",
                blueprint.sink.path.display()
            ),
        ));
    }

    Ok(())
}

/// 校验 sink 配置
fn validate_sink(blueprint: &AcquisitionBlueprint) -> Result<(), ContractError> {
    if blueprint.sink.name.trim().is_empty() {
        return Err(ContractError::config_validation(
            "sink.name",
            "sink name cannot be empty",
        ));
    }
    Ok(())
}

/// 校验 trace 前缀
fn validate_trace(blueprint: &AcquisitionBlueprint) -> Result<(), ContractError> {
    let trace = &blueprint.trace;
    if !trace.enabled {
        return Ok(());
    }

    if trace.distance_prefix.trim().is_empty() || trace.status_prefix.trim().is_empty() {
        return Err(ContractError::config_validation(
            "trace",
            "trace prefixes cannot be empty",
        ));
    }

    if trace.distance_prefix == trace.status_prefix {
        return Err(ContractError::config_validation(
            "trace",
            format!(
                "distance and status prefixes must differ, both are '{}'",
                trace.distance_prefix
            ),
        ));
    }

    Ok(())
}
