//! Sensor Projections
//!
//! Numeric and textual read-only projections. The derived computations here
//! carry the semantics that matter:
//!
//! - RAM used is `total - available`, not `total - free`: "available" already
//!   accounts for reclaimable cache and buffers, so this matches what an
//!   operator thinks of as memory pressure.
//! - UPS current power and remaining battery capacity are derived from the
//!   *configured* nominal power and battery capacity options; without the
//!   option the derived value stays unknown.

use super::{attr_opt, slug, Attributes, EntityKind, EntityState, EntityValue};
use crate::config::UpsConfig;
use crate::coordinator::{InfraSnapshot, StorageSnapshot, SystemSnapshot};
use crate::unraid::types::*;

/// RAM used in bytes: `total - available`. Unknown when either operand is
/// absent; never substitutes `free` for `available`.
pub fn ram_used(metrics: &SystemMetrics) -> Option<u64> {
    let memory = metrics.memory.as_ref()?;
    let total = memory.total?;
    let available = memory.available?;
    Some(total.saturating_sub(available))
}

/// RAM usage percent derived from [`ram_used`].
pub fn ram_percent(metrics: &SystemMetrics) -> Option<f64> {
    let total = metrics.memory.as_ref()?.total?;
    if total == 0 {
        return None;
    }
    Some(ram_used(metrics)? as f64 / total as f64 * 100.0)
}

pub fn cpu_percent(metrics: &SystemMetrics) -> Option<f64> {
    metrics.cpu.as_ref()?.percent_total
}

/// Watts drawn right now: load% of the configured nominal power.
pub fn ups_current_power(ups: &UpsDevice, nominal_power_watts: Option<f64>) -> Option<f64> {
    let load = ups.power.as_ref()?.load_percentage?;
    Some(load / 100.0 * nominal_power_watts?)
}

/// Amp-hours left in the battery: charge% of the configured capacity.
pub fn ups_remaining_capacity(ups: &UpsDevice, battery_capacity_ah: Option<f64>) -> Option<f64> {
    let charge = ups.battery.as_ref()?.charge_level?;
    Some(charge / 100.0 * battery_capacity_ah?)
}

pub fn system_sensors(snapshot: &SystemSnapshot, ups_config: &UpsConfig) -> Vec<EntityState> {
    let mut entities = Vec::new();

    let mut server_attrs = Attributes::new();
    attr_opt(
        &mut server_attrs,
        "version",
        snapshot.server_info.version.as_deref(),
    );
    attr_opt(
        &mut server_attrs,
        "guid",
        snapshot.server_info.guid.as_deref(),
    );
    entities.push(
        EntityState::new(EntityKind::Sensor, "sensor.uptime", "Uptime")
            .with_value(EntityValue::from_float(snapshot.server_info.uptime_seconds))
            .with_attributes(server_attrs),
    );

    entities.push(
        EntityState::new(EntityKind::Sensor, "sensor.cpu_utilization", "CPU utilization")
            .with_value(EntityValue::from_float(cpu_percent(&snapshot.metrics))),
    );
    entities.push(
        EntityState::new(EntityKind::Sensor, "sensor.ram_used", "RAM used")
            .with_value(EntityValue::from_u64(ram_used(&snapshot.metrics))),
    );
    entities.push(
        EntityState::new(EntityKind::Sensor, "sensor.ram_total", "RAM total").with_value(
            EntityValue::from_u64(snapshot.metrics.memory.as_ref().and_then(|m| m.total)),
        ),
    );
    entities.push(
        EntityState::new(EntityKind::Sensor, "sensor.ram_usage", "RAM usage")
            .with_value(EntityValue::from_float(ram_percent(&snapshot.metrics))),
    );

    entities.push(
        EntityState::new(
            EntityKind::Sensor,
            "sensor.unread_notifications",
            "Unread notifications",
        )
        .with_value(EntityValue::Int(snapshot.unread_count))
        .with_attributes({
            let mut attrs = Attributes::new();
            attrs.insert("info".into(), snapshot.notifications.unread.info.into());
            attrs.insert(
                "warning".into(),
                snapshot.notifications.unread.warning.into(),
            );
            attrs.insert("alert".into(), snapshot.notifications.unread.alert.into());
            attrs
        }),
    );

    let running_containers = snapshot
        .containers
        .iter()
        .filter(|c| c.is_running() == Some(true))
        .count() as i64;
    entities.push(
        EntityState::new(EntityKind::Sensor, "sensor.containers", "Containers")
            .with_value(EntityValue::Int(snapshot.containers.len() as i64))
            .with_attributes({
                let mut attrs = Attributes::new();
                attrs.insert("running".into(), running_containers.into());
                attrs
            }),
    );

    let running_vms = snapshot
        .vms
        .iter()
        .filter(|v| v.is_running() == Some(true))
        .count() as i64;
    entities.push(
        EntityState::new(EntityKind::Sensor, "sensor.vms", "Virtual machines")
            .with_value(EntityValue::Int(snapshot.vms.len() as i64))
            .with_attributes({
                let mut attrs = Attributes::new();
                attrs.insert("running".into(), running_vms.into());
                attrs
            }),
    );

    for ups in &snapshot.ups_devices {
        let ups_slug = slug(ups.name.as_deref().unwrap_or(&ups.id));
        let mut attrs = Attributes::new();
        attr_opt(&mut attrs, "model", ups.model.as_deref());
        attr_opt(&mut attrs, "status", ups.status.as_deref());

        entities.push(
            EntityState::new(
                EntityKind::Sensor,
                format!("sensor.ups_{ups_slug}_charge"),
                format!("UPS {} charge", ups.name.as_deref().unwrap_or(&ups.id)),
            )
            .with_value(EntityValue::from_float(
                ups.battery.as_ref().and_then(|b| b.charge_level),
            ))
            .with_attributes(attrs),
        );
        entities.push(
            EntityState::new(
                EntityKind::Sensor,
                format!("sensor.ups_{ups_slug}_runtime"),
                format!("UPS {} runtime", ups.name.as_deref().unwrap_or(&ups.id)),
            )
            .with_value(EntityValue::from_float(
                ups.battery.as_ref().and_then(|b| b.estimated_runtime),
            )),
        );
        entities.push(
            EntityState::new(
                EntityKind::Sensor,
                format!("sensor.ups_{ups_slug}_load"),
                format!("UPS {} load", ups.name.as_deref().unwrap_or(&ups.id)),
            )
            .with_value(EntityValue::from_float(
                ups.power.as_ref().and_then(|p| p.load_percentage),
            )),
        );
        entities.push(
            EntityState::new(
                EntityKind::Sensor,
                format!("sensor.ups_{ups_slug}_power"),
                format!("UPS {} current power", ups.name.as_deref().unwrap_or(&ups.id)),
            )
            .with_value(EntityValue::from_float(ups_current_power(
                ups,
                ups_config.nominal_power_watts,
            ))),
        );
        entities.push(
            EntityState::new(
                EntityKind::Sensor,
                format!("sensor.ups_{ups_slug}_remaining_capacity"),
                format!(
                    "UPS {} remaining capacity",
                    ups.name.as_deref().unwrap_or(&ups.id)
                ),
            )
            .with_value(EntityValue::from_float(ups_remaining_capacity(
                ups,
                ups_config.battery_capacity_ah,
            ))),
        );
    }

    entities
}

pub fn storage_sensors(snapshot: &StorageSnapshot) -> Vec<EntityState> {
    let mut entities = Vec::new();

    let capacity = snapshot
        .array
        .capacity
        .as_ref()
        .map(|c| &c.kilobytes);
    let mut array_attrs = Attributes::new();
    attr_opt(&mut array_attrs, "used_kb", capacity.and_then(|c| c.used));
    attr_opt(&mut array_attrs, "total_kb", capacity.and_then(|c| c.total));
    entities.push(
        EntityState::new(EntityKind::Sensor, "sensor.array_free", "Array free space")
            .with_value(EntityValue::from_u64(capacity.and_then(|c| c.free)))
            .with_attributes(array_attrs),
    );
    entities.push(
        EntityState::new(EntityKind::Sensor, "sensor.array_state", "Array state")
            .with_value(EntityValue::from_text(snapshot.array.state.as_deref())),
    );

    for disk in snapshot
        .array
        .disks
        .iter()
        .chain(&snapshot.array.parities)
        .chain(&snapshot.array.caches)
    {
        let name = disk.name.as_deref().unwrap_or(&disk.id);
        let disk_slug = slug(name);
        let mut attrs = Attributes::new();
        attr_opt(&mut attrs, "device", disk.device.as_deref());
        attr_opt(&mut attrs, "status", disk.status.as_deref());
        attr_opt(&mut attrs, "errors", disk.num_errors);

        entities.push(
            EntityState::new(
                EntityKind::Sensor,
                format!("sensor.disk_{disk_slug}_temperature"),
                format!("Disk {name} temperature"),
            )
            .with_value(EntityValue::from_float(disk.temp))
            .with_attributes(attrs),
        );
    }

    // Parity slots carry no filesystem, so fs usage covers data and cache
    // disks only.
    for disk in snapshot.array.disks.iter().chain(&snapshot.array.caches) {
        let name = disk.name.as_deref().unwrap_or(&disk.id);
        let disk_slug = slug(name);
        let mut attrs = Attributes::new();
        attr_opt(&mut attrs, "fs_free_kb", disk.fs_free);
        attr_opt(&mut attrs, "fs_size_kb", disk.fs_size);

        entities.push(
            EntityState::new(
                EntityKind::Sensor,
                format!("sensor.disk_{disk_slug}_fs_used"),
                format!("Disk {name} fs used"),
            )
            .with_value(EntityValue::from_u64(disk.fs_used))
            .with_attributes(attrs),
        );
    }

    for share in &snapshot.shares {
        let mut attrs = Attributes::new();
        attr_opt(&mut attrs, "comment", share.comment.as_deref());
        attr_opt(&mut attrs, "used_kb", share.used);
        entities.push(
            EntityState::new(
                EntityKind::Sensor,
                format!("sensor.share_{}_free", slug(&share.name)),
                format!("Share {} free space", share.name),
            )
            .with_value(EntityValue::from_u64(share.free))
            .with_attributes(attrs),
        );
    }

    if let Some(check) = snapshot.latest_parity_check() {
        let mut attrs = Attributes::new();
        attr_opt(&mut attrs, "status", check.status.as_deref());
        attr_opt(&mut attrs, "errors", check.errors);
        attr_opt(&mut attrs, "speed", check.speed.as_deref());
        attr_opt(&mut attrs, "date", check.date.as_deref());
        entities.push(
            EntityState::new(
                EntityKind::Sensor,
                "sensor.parity_check_progress",
                "Parity check progress",
            )
            .with_value(EntityValue::from_float(check.progress))
            .with_attributes(attrs),
        );
    }

    entities
}

pub fn infra_sensors(snapshot: &InfraSnapshot) -> Vec<EntityState> {
    let mut entities = Vec::new();

    entities.push(
        EntityState::new(EntityKind::Sensor, "sensor.plugins", "Installed plugins")
            .with_value(EntityValue::Int(snapshot.plugins.len() as i64))
            .with_attributes({
                let mut attrs = Attributes::new();
                let updates = snapshot.plugins.iter().filter(|p| p.has_update).count() as i64;
                attrs.insert("updates_available".into(), updates.into());
                attrs
            }),
    );

    if let Some(registration) = &snapshot.registration {
        let mut attrs = Attributes::new();
        attr_opt(&mut attrs, "state", registration.state.as_deref());
        attr_opt(&mut attrs, "expiration", registration.expiration.as_deref());
        entities.push(
            EntityState::new(EntityKind::Sensor, "sensor.registration", "License")
                .with_value(EntityValue::from_text(registration.license_type.as_deref()))
                .with_attributes(attrs),
        );
    }

    entities
}
