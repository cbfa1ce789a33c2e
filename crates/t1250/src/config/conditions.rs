//! Per-business-unit condition flags.
//!
//! Flags arrive as a positional string such as `"01100100"`. A position holds
//! `1`, `Y` or `y` when the flag is set; anything else (or a string too short
//! to reach the position) leaves it unset. The per-service-code flags are
//! suppressions: setting `send_sc_2` stops notifications for code 2.

use super::schema::FlagPositions;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ServiceCodePolicy {
    #[default]
    Send,
    Suppress,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConditionMap {
    pub item_nbr_exception_required: bool,
    pub send_email: bool,
    pub send_sms: bool,
    pub send_sc_1: ServiceCodePolicy,
    pub send_sc_2: ServiceCodePolicy,
    pub send_sc_4: ServiceCodePolicy,
    pub delay_template_sc_2: bool,
    pub delay_template_sc_4: bool,
}

impl ConditionMap {
    pub fn from_flags(flags: &str, positions: &FlagPositions) -> Self {
        let chars: Vec<char> = flags.chars().collect();
        let is_set = |pos: usize| matches!(chars.get(pos), Some('1' | 'Y' | 'y'));
        let policy = |pos: usize| {
            if is_set(pos) {
                ServiceCodePolicy::Suppress
            } else {
                ServiceCodePolicy::Send
            }
        };

        Self {
            item_nbr_exception_required: is_set(positions.item_nbr_exception_required),
            send_email: is_set(positions.send_email),
            send_sms: is_set(positions.send_sms),
            send_sc_1: policy(positions.send_sc_1),
            send_sc_2: policy(positions.send_sc_2),
            send_sc_4: policy(positions.send_sc_4),
            delay_template_sc_2: is_set(positions.delay_template_sc_2),
            delay_template_sc_4: is_set(positions.delay_template_sc_4),
        }
    }

    /// Policy for service codes that carry their own flag (1, 2 and 4).
    pub fn policy_for(&self, service_code: u8) -> Option<ServiceCodePolicy> {
        match service_code {
            1 => Some(self.send_sc_1),
            2 => Some(self.send_sc_2),
            4 => Some(self.send_sc_4),
            _ => None,
        }
    }
}
