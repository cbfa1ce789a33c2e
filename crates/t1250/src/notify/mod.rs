//! Whether a newly loaded item should trigger customer notification, and
//! through which channels.

pub mod queue;

use std::fmt;

use crate::config::{ConditionMap, ServiceCodePolicy};
use crate::mapper::{column_text, ColumnMap};
use crate::store::{columns, ItemId};

pub use queue::{default_flags_directory, CommsQueue, FlagDirQueue, MemoryQueue, QueueError};

/// Service code of primary-elect deliveries, notified by a separate flow.
pub const PRIMARY_ELECT: u8 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateId {
    Standard,
    Delay,
}

impl TemplateId {
    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateId::Standard => "standard",
            TemplateId::Delay => "delay",
        }
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Email,
    Sms,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Email => "email",
            Channel::Sms => "sms",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotificationDecision {
    pub send_email: bool,
    pub send_sms: bool,
    pub template: TemplateId,
}

impl NotificationDecision {
    pub fn none() -> Self {
        Self {
            send_email: false,
            send_sms: false,
            template: TemplateId::Standard,
        }
    }

    pub fn sends(&self) -> bool {
        self.send_email || self.send_sms
    }
}

/// A queued notification for one job item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PendingComms {
    pub channel: Channel,
    pub job_item_id: ItemId,
    pub template: TemplateId,
}

pub fn decide(service_code: Option<u8>, conditions: &ConditionMap) -> NotificationDecision {
    let Some(code) = service_code else {
        return NotificationDecision {
            send_email: conditions.send_email,
            send_sms: conditions.send_sms,
            template: TemplateId::Standard,
        };
    };

    if code == PRIMARY_ELECT {
        return NotificationDecision::none();
    }

    let allowed = conditions
        .policy_for(code)
        .map_or(true, |policy| policy == ServiceCodePolicy::Send);
    let delay = match code {
        2 => conditions.delay_template_sc_2,
        4 => conditions.delay_template_sc_4,
        _ => false,
    };

    NotificationDecision {
        send_email: allowed && conditions.send_email,
        send_sms: allowed && conditions.send_sms,
        template: if delay {
            TemplateId::Delay
        } else {
            TemplateId::Standard
        },
    }
}

/// Reads the service code column as written by the `service_code` callback.
pub fn service_code_of(job: &ColumnMap) -> Option<u8> {
    column_text(job, columns::SERVICE_CODE).and_then(|code| code.parse().ok())
}

/// Markers for the channels the decision allows and the item has a contact
/// value for.
pub fn markers(
    decision: &NotificationDecision,
    job_item_id: ItemId,
    item: &ColumnMap,
) -> Vec<PendingComms> {
    let mut pending = Vec::new();
    let wanted = [
        (decision.send_email, Channel::Email, columns::EMAIL),
        (decision.send_sms, Channel::Sms, columns::MOBILE),
    ];
    for (send, channel, contact) in wanted {
        if send && column_text(item, contact).is_some() {
            pending.push(PendingComms {
                channel,
                job_item_id,
                template: decision.template,
            });
        }
    }
    pending
}
