//! Binary Sensor Projections
//!
//! Problem-class sensors follow the "on = bad" convention, so the parity
//! sensor here reports *invalid*, the inverse of plain validity. All state
//! comparisons are case-insensitive; servers have reported both "STARTED"
//! and "started" across versions.

use super::{attr_opt, slug, Attributes, EntityKind, EntityState, EntityValue};
use crate::coordinator::{InfraSnapshot, StorageSnapshot, SystemSnapshot};
use crate::unraid::types::*;

/// Array is started. Unknown when the state field is absent.
pub fn array_started(array: &ArrayStatus) -> Option<bool> {
    array
        .state
        .as_deref()
        .map(|s| s.eq_ignore_ascii_case(ARRAY_STATE_STARTED))
}

/// Parity is invalid (problem sensor, on = bad): status FAILED or any
/// recorded errors. Unknown when the record has no status.
pub fn parity_invalid(check: &ParityCheck) -> Option<bool> {
    let status = check.status.as_deref()?;
    Some(
        status.eq_ignore_ascii_case(PARITY_STATUS_FAILED) || check.errors.unwrap_or(0) > 0,
    )
}

/// Parity check is in progress: RUNNING or PAUSED both count.
pub fn parity_running(check: &ParityCheck) -> Option<bool> {
    check.status.as_deref().map(|s| {
        s.eq_ignore_ascii_case(PARITY_STATUS_RUNNING)
            || s.eq_ignore_ascii_case(PARITY_STATUS_PAUSED)
    })
}

/// Disk has a problem: a status is reported and it is not DISK_OK.
pub fn disk_has_problem(disk: &ArrayDisk) -> Option<bool> {
    disk.status
        .as_deref()
        .map(|s| !s.eq_ignore_ascii_case(DISK_STATUS_OK))
}

/// UPS is on mains power.
pub fn ups_online(ups: &UpsDevice) -> Option<bool> {
    ups.status
        .as_deref()
        .map(|s| s.to_ascii_uppercase().contains("ONLINE"))
}

pub fn system_binary_sensors(snapshot: &SystemSnapshot) -> Vec<EntityState> {
    let mut entities = Vec::new();

    for ups in &snapshot.ups_devices {
        let name = ups.name.as_deref().unwrap_or(&ups.id);
        let mut attrs = Attributes::new();
        attr_opt(&mut attrs, "status", ups.status.as_deref());
        entities.push(
            EntityState::new(
                EntityKind::BinarySensor,
                format!("binary_sensor.ups_{}_online", slug(name)),
                format!("UPS {name} online"),
            )
            .with_value(EntityValue::from_bool(ups_online(ups)))
            .with_attributes(attrs),
        );
    }

    entities
}

pub fn storage_binary_sensors(snapshot: &StorageSnapshot) -> Vec<EntityState> {
    let mut entities = Vec::new();

    entities.push(
        EntityState::new(
            EntityKind::BinarySensor,
            "binary_sensor.array_started",
            "Array started",
        )
        .with_value(EntityValue::from_bool(array_started(&snapshot.array))),
    );

    let latest = snapshot.latest_parity_check();
    entities.push(
        EntityState::new(
            EntityKind::BinarySensor,
            "binary_sensor.parity_problem",
            "Parity problem",
        )
        .with_value(EntityValue::from_bool(latest.and_then(parity_invalid))),
    );
    entities.push(
        EntityState::new(
            EntityKind::BinarySensor,
            "binary_sensor.parity_check_running",
            "Parity check running",
        )
        .with_value(EntityValue::from_bool(latest.and_then(parity_running))),
    );

    for disk in snapshot
        .array
        .disks
        .iter()
        .chain(&snapshot.array.parities)
        .chain(&snapshot.array.caches)
    {
        let name = disk.name.as_deref().unwrap_or(&disk.id);
        let mut attrs = Attributes::new();
        attr_opt(&mut attrs, "status", disk.status.as_deref());
        attr_opt(&mut attrs, "errors", disk.num_errors);
        entities.push(
            EntityState::new(
                EntityKind::BinarySensor,
                format!("binary_sensor.disk_{}_health", slug(name)),
                format!("Disk {name} health"),
            )
            .with_value(EntityValue::from_bool(disk_has_problem(disk)))
            .with_attributes(attrs),
        );
    }

    entities
}

pub fn infra_binary_sensors(snapshot: &InfraSnapshot) -> Vec<EntityState> {
    let mut entities = Vec::new();

    for service in &snapshot.services {
        let name = service.name.as_deref().unwrap_or(&service.id);
        let mut attrs = Attributes::new();
        attr_opt(&mut attrs, "version", service.version.as_deref());
        attr_opt(&mut attrs, "uptime", service.uptime.as_deref());
        entities.push(
            EntityState::new(
                EntityKind::BinarySensor,
                format!("binary_sensor.service_{}", slug(name)),
                format!("Service {name}"),
            )
            .with_value(EntityValue::from_bool(service.online))
            .with_attributes(attrs),
        );
    }

    if let Some(remote) = &snapshot.remote_access {
        entities.push(
            EntityState::new(
                EntityKind::BinarySensor,
                "binary_sensor.remote_access",
                "Remote access",
            )
            .with_value(EntityValue::from_bool(remote.accessible)),
        );
    }

    entities
}
