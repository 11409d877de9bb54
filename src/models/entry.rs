use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Classification of a time entry. The numeric codes are stable and stored
/// in the database; `Automatic` entries are synthesized by salary
/// reconciliation and never entered by hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum EntryType {
    Timeclock,
    Manual,
    Holiday,
    PersonalLeave,
    BereavementJury,
    Overtime,
    Automatic,
    CompanyTime,
    SwapTime,
    MedAssist,
    Fmla100,
    Fmla67,
}

impl EntryType {
    pub fn code(self) -> i64 {
        match self {
            EntryType::Timeclock => 1,
            EntryType::Manual => 2,
            EntryType::Holiday => 3,
            EntryType::PersonalLeave => 4,
            EntryType::BereavementJury => 5,
            EntryType::Overtime => 6,
            EntryType::Automatic => 7,
            EntryType::CompanyTime => 8,
            EntryType::SwapTime => 9,
            EntryType::MedAssist => 10,
            EntryType::Fmla100 => 11,
            EntryType::Fmla67 => 12,
        }
    }

    pub fn from_code(code: i64) -> Option<EntryType> {
        match code {
            1 => Some(EntryType::Timeclock),
            2 => Some(EntryType::Manual),
            3 => Some(EntryType::Holiday),
            4 => Some(EntryType::PersonalLeave),
            5 => Some(EntryType::BereavementJury),
            6 => Some(EntryType::Overtime),
            7 => Some(EntryType::Automatic),
            8 => Some(EntryType::CompanyTime),
            9 => Some(EntryType::SwapTime),
            10 => Some(EntryType::MedAssist),
            11 => Some(EntryType::Fmla100),
            12 => Some(EntryType::Fmla67),
            _ => None,
        }
    }

}

impl From<EntryType> for i64 {
    fn from(value: EntryType) -> i64 {
        value.code()
    }
}

impl TryFrom<i64> for EntryType {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        EntryType::from_code(value).ok_or_else(|| format!("Unknown entry type code: {}", value))
    }
}

/// Capability flags carried by a clock action. Any combination is valid and
/// each flag is tested independently; an adjustment action may also carry a
/// clock-in or clock-out flag. Persisted as the legacy bitmask
/// (adjustment=1, clock in=2, clock out=4, comment=8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ActionType {
    #[serde(default)]
    pub adjustment: bool,
    #[serde(default)]
    pub clock_in: bool,
    #[serde(default)]
    pub clock_out: bool,
    #[serde(default)]
    pub comment: bool,
}

const ADJUSTMENT_BIT: i64 = 1;
const CLOCK_IN_BIT: i64 = 2;
const CLOCK_OUT_BIT: i64 = 4;
const COMMENT_BIT: i64 = 8;

impl ActionType {
    pub const ADJUSTMENT: ActionType = ActionType {
        adjustment: true,
        clock_in: false,
        clock_out: false,
        comment: false,
    };
    pub const CLOCK_IN: ActionType = ActionType {
        adjustment: false,
        clock_in: true,
        clock_out: false,
        comment: false,
    };
    pub const CLOCK_OUT: ActionType = ActionType {
        adjustment: false,
        clock_in: false,
        clock_out: true,
        comment: false,
    };
    pub const COMMENT: ActionType = ActionType {
        adjustment: false,
        clock_in: false,
        clock_out: false,
        comment: true,
    };

    pub fn bits(self) -> i64 {
        let mut bits = 0;
        if self.adjustment {
            bits |= ADJUSTMENT_BIT;
        }
        if self.clock_in {
            bits |= CLOCK_IN_BIT;
        }
        if self.clock_out {
            bits |= CLOCK_OUT_BIT;
        }
        if self.comment {
            bits |= COMMENT_BIT;
        }
        bits
    }

    pub fn from_bits(bits: i64) -> ActionType {
        ActionType {
            adjustment: bits & ADJUSTMENT_BIT != 0,
            clock_in: bits & CLOCK_IN_BIT != 0,
            clock_out: bits & CLOCK_OUT_BIT != 0,
            comment: bits & COMMENT_BIT != 0,
        }
    }

    pub fn with_adjustment(mut self) -> ActionType {
        self.adjustment = true;
        self
    }
}

/// One immutable event in an entry's history. Actions are append-only:
/// corrections append new actions, they never edit existing ones.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryAction {
    pub id: i64,
    pub entry_id: i64,
    pub action_type: ActionType,
    pub time: DateTime<Utc>,
    pub ip: String,
    pub notes: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// One unit of recorded time: a clock session, a manual adjustment, a leave
/// grant or a synthetic reconciliation entry.
///
/// `week`, `actions`, `errors` and `is_clocked_in` are derived at load time
/// and never persisted. Duration of an open timeclock entry is likewise
/// derived (now minus clock-in) until a clock-out confirms it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry {
    pub id: i64,
    pub employee_id: i64,
    pub entry_type: EntryType,
    pub user_id: i64,
    pub entry_date: DateTime<Utc>,
    /// Duration in seconds.
    pub duration: i64,
    pub note: String,
    pub employee_approved: bool,
    pub employee_approval_time: Option<DateTime<Utc>>,
    pub approved: bool,
    pub approval_time: Option<DateTime<Utc>>,
    pub approved_by: Option<i64>,
    pub deleted: bool,
    pub deleted_by: Option<i64>,
    pub pay_period_id: i64,
    /// 0 for the first week of the pay period, 1 for the second.
    pub week: u8,
    pub created_at: DateTime<Utc>,
    pub actions: Vec<EntryAction>,
    pub errors: Vec<String>,
    pub is_clocked_in: bool,
}

impl Entry {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}
