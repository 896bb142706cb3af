//! Macro for implementing Display and FromStr for domain enums
//!
//! Every enum that is persisted or read from spreadsheets goes through this
//! macro so that storage, logs and import files share one spelling.
//!
//! # Example
//!
//! ```rust
//! use costledger_domain::impl_domain_status_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum PaymentStatus {
//!     Unpaid,
//!     Paid,
//! }
//!
//! impl_domain_status_conversions!(PaymentStatus {
//!     Unpaid => "unpaid",
//!     Paid => "paid",
//! });
//!
//! assert_eq!(PaymentStatus::Paid.as_str(), "paid");
//! assert_eq!("UNPAID".parse::<PaymentStatus>(), Ok(PaymentStatus::Unpaid));
//! ```

/// Implements `as_str`, `Display` and `FromStr` for a fieldless enum.
///
/// String representations must be lowercase; parsing is case-insensitive and
/// ignores surrounding whitespace.
#[macro_export]
macro_rules! impl_domain_status_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl $enum_name {
            /// Canonical lowercase representation.
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $str,)+
                }
            }
        }

        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($str => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum TestStatus {
        New,
        InProgress,
        Processed,
    }

    impl_domain_status_conversions!(TestStatus {
        New => "new",
        InProgress => "in_progress",
        Processed => "processed",
    });

    #[test]
    fn display_uses_lowercase_spelling() {
        assert_eq!(TestStatus::New.to_string(), "new");
        assert_eq!(TestStatus::InProgress.to_string(), "in_progress");
        assert_eq!(TestStatus::Processed.as_str(), "processed");
    }

    #[test]
    fn parsing_ignores_case_and_padding() {
        assert_eq!(TestStatus::from_str("IN_PROGRESS").unwrap(), TestStatus::InProgress);
        assert_eq!(TestStatus::from_str(" Processed ").unwrap(), TestStatus::Processed);
    }

    #[test]
    fn unknown_value_names_the_enum() {
        let err = TestStatus::from_str("archived").unwrap_err();
        assert!(err.contains("Invalid TestStatus: archived"));
        assert!(TestStatus::from_str("").is_err());
    }

    mod with_result_alias {
        use std::str::FromStr;

        #[allow(dead_code)]
        type Result<T> = std::result::Result<T, crate::LedgerError>;

        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        enum Phase {
            Open,
            Closed,
        }

        impl_domain_status_conversions!(Phase {
            Open => "open",
            Closed => "closed",
        });

        #[test]
        fn expands_next_to_single_argument_result_alias() {
            assert_eq!(Phase::from_str("CLOSED"), Ok(Phase::Closed));
            assert_eq!(Phase::Open.to_string(), "open");
        }
    }
}
