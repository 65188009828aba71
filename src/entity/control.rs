//! Switches and Buttons
//!
//! The action side of the entity model. Switch state is read from the
//! snapshot like any other projection; the toggle itself goes straight to
//! the API client, deliberately bypassing the coordinators. Nothing is
//! cached here, so the entity keeps showing the pre-action state until the
//! owning tier polls again.

use super::{attr_opt, slug, Attributes, EntityKind, EntityState, EntityValue};
use crate::coordinator::{StorageSnapshot, SystemSnapshot};
use crate::error::{Result, UnraidError};
use crate::unraid::UnraidClient;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerAction {
    Start,
    Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VmAction {
    Start,
    Stop,
    Pause,
    Resume,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayAction {
    Start,
    Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParityAction {
    Start,
    Pause,
    Resume,
    Cancel,
}

impl FromStr for ContainerAction {
    type Err = UnraidError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "start" => Ok(Self::Start),
            "stop" => Ok(Self::Stop),
            other => Err(UnraidError::Config(format!(
                "unknown container action '{other}'"
            ))),
        }
    }
}

impl FromStr for VmAction {
    type Err = UnraidError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "start" => Ok(Self::Start),
            "stop" => Ok(Self::Stop),
            "pause" => Ok(Self::Pause),
            "resume" => Ok(Self::Resume),
            other => Err(UnraidError::Config(format!("unknown vm action '{other}'"))),
        }
    }
}

impl FromStr for ArrayAction {
    type Err = UnraidError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "start" => Ok(Self::Start),
            "stop" => Ok(Self::Stop),
            other => Err(UnraidError::Config(format!(
                "unknown array action '{other}'"
            ))),
        }
    }
}

impl FromStr for ParityAction {
    type Err = UnraidError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "start" => Ok(Self::Start),
            "pause" => Ok(Self::Pause),
            "resume" => Ok(Self::Resume),
            "cancel" => Ok(Self::Cancel),
            other => Err(UnraidError::Config(format!(
                "unknown parity action '{other}'"
            ))),
        }
    }
}

pub async fn run_container_action(
    client: &UnraidClient,
    id: &str,
    action: ContainerAction,
) -> Result<()> {
    match action {
        ContainerAction::Start => client.start_container(id).await,
        ContainerAction::Stop => client.stop_container(id).await,
    }
}

pub async fn run_vm_action(client: &UnraidClient, id: &str, action: VmAction) -> Result<()> {
    match action {
        VmAction::Start => client.start_vm(id).await,
        VmAction::Stop => client.stop_vm(id).await,
        VmAction::Pause => client.pause_vm(id).await,
        VmAction::Resume => client.resume_vm(id).await,
    }
}

pub async fn run_array_action(client: &UnraidClient, action: ArrayAction) -> Result<()> {
    match action {
        ArrayAction::Start => client.start_array().await,
        ArrayAction::Stop => client.stop_array().await,
    }
}

pub async fn run_parity_action(
    client: &UnraidClient,
    action: ParityAction,
    correct: bool,
) -> Result<()> {
    match action {
        ParityAction::Start => client.start_parity_check(correct).await,
        ParityAction::Pause => client.pause_parity_check().await,
        ParityAction::Resume => client.resume_parity_check().await,
        ParityAction::Cancel => client.cancel_parity_check().await,
    }
}

/// Container and vm switches: on = running.
pub fn system_controls(snapshot: &SystemSnapshot) -> Vec<EntityState> {
    let mut entities = Vec::new();

    for container in &snapshot.containers {
        let name = container.display_name();
        let mut attrs = Attributes::new();
        attr_opt(&mut attrs, "image", container.image.as_deref());
        attr_opt(&mut attrs, "status", container.status.as_deref());
        attrs.insert("action_id".into(), container.id.clone().into());
        entities.push(
            EntityState::new(
                EntityKind::Switch,
                format!("switch.docker_{}", slug(name)),
                format!("Container {name}"),
            )
            .with_value(EntityValue::from_bool(container.is_running()))
            .with_attributes(attrs),
        );
    }

    for vm in &snapshot.vms {
        let name = vm.name.as_deref().unwrap_or(&vm.uuid);
        let mut attrs = Attributes::new();
        attr_opt(&mut attrs, "state", vm.state.as_deref());
        attrs.insert("action_id".into(), vm.uuid.clone().into());
        entities.push(
            EntityState::new(
                EntityKind::Switch,
                format!("switch.vm_{}", slug(name)),
                format!("VM {name}"),
            )
            .with_value(EntityValue::from_bool(vm.is_running()))
            .with_attributes(attrs),
        );
    }

    entities
}

/// Array and parity buttons. Stateless by definition; values stay unknown.
pub fn storage_controls(_snapshot: &StorageSnapshot) -> Vec<EntityState> {
    [
        ("button.array_start", "Start array"),
        ("button.array_stop", "Stop array"),
        ("button.parity_check_start", "Start parity check"),
        ("button.parity_check_pause", "Pause parity check"),
        ("button.parity_check_resume", "Resume parity check"),
        ("button.parity_check_cancel", "Cancel parity check"),
    ]
    .into_iter()
    .map(|(id, name)| EntityState::new(EntityKind::Button, id, name))
    .collect()
}
