//! Maps account resource ID parsing
//!
//! Format: `/subscriptions/{sub}/resourceGroups/{rg}/providers/Microsoft.Maps/accounts/{name}`

use std::fmt;

use thiserror::Error;

const PROVIDER_NAMESPACE: &str = "Microsoft.Maps";

/// Errors produced while parsing a Maps account ID
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccountIdError {
    #[error("ID was empty")]
    Empty,

    #[error("parsing {id:?}: expected {expected} segments, got {got}")]
    SegmentCount {
        id: String,
        expected: usize,
        got: usize,
    },

    #[error("parsing {id:?}: expected segment {expected:?}, got {got:?}")]
    UnexpectedSegment {
        id: String,
        expected: String,
        got: String,
    },

    #[error("parsing {id:?}: the value for {segment:?} was empty")]
    EmptyValue { id: String, segment: String },
}

/// Identity of a Maps account
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AccountId {
    pub subscription_id: String,
    pub resource_group: String,
    pub name: String,
}

impl AccountId {
    pub fn new(
        subscription_id: impl Into<String>,
        resource_group: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            subscription_id: subscription_id.into(),
            resource_group: resource_group.into(),
            name: name.into(),
        }
    }

    /// Parse a resource ID; segment keys are matched case-insensitively
    pub fn parse(input: &str) -> Result<Self, AccountIdError> {
        if input.is_empty() {
            return Err(AccountIdError::Empty);
        }

        let segments: Vec<&str> = input.trim_start_matches('/').split('/').collect();
        // subscriptions/{}/resourceGroups/{}/providers/{ns}/accounts/{}
        if segments.len() != 8 {
            return Err(AccountIdError::SegmentCount {
                id: input.to_string(),
                expected: 8,
                got: segments.len(),
            });
        }

        let expect_key = |index: usize, expected: &str| {
            if segments[index].eq_ignore_ascii_case(expected) {
                Ok(())
            } else {
                Err(AccountIdError::UnexpectedSegment {
                    id: input.to_string(),
                    expected: expected.to_string(),
                    got: segments[index].to_string(),
                })
            }
        };
        let value = |index: usize| {
            let v = segments[index];
            if v.is_empty() {
                Err(AccountIdError::EmptyValue {
                    id: input.to_string(),
                    segment: segments[index - 1].to_string(),
                })
            } else {
                Ok(v.to_string())
            }
        };

        expect_key(0, "subscriptions")?;
        let subscription_id = value(1)?;
        expect_key(2, "resourceGroups")?;
        let resource_group = value(3)?;
        expect_key(4, "providers")?;
        expect_key(5, PROVIDER_NAMESPACE)?;
        expect_key(6, "accounts")?;
        let name = value(7)?;

        Ok(Self {
            subscription_id,
            resource_group,
            name,
        })
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "/subscriptions/{}/resourceGroups/{}/providers/{}/accounts/{}",
            self.subscription_id, self.resource_group, PROVIDER_NAMESPACE, self.name
        )
    }
}
