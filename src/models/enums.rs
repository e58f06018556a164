// src/models/enums.rs

//! Closed value sets stored as VARCHAR columns.
//!
//! Each enum serialises to its SCREAMING_SNAKE_CASE wire value, parses from it
//! with `FromStr` (services turn the parse error into a 400), and encodes /
//! decodes through sqlx as plain text.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid {kind} '{value}'. Allowed values: {allowed}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
    pub allowed: String,
}

macro_rules! db_enum {
    (
        $(#[$meta:meta])*
        $name:ident ($kind:literal) {
            $( $variant:ident => $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
        pub enum $name {
            $(
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let normalized = s.trim().to_ascii_uppercase();
                match normalized.as_str() {
                    $($text => Ok($name::$variant),)+
                    _ => Err(ParseEnumError {
                        kind: $kind,
                        value: s.to_string(),
                        allowed: [$($text),+].join(", "),
                    }),
                }
            }
        }

        impl sqlx::Type<sqlx::Postgres> for $name {
            fn type_info() -> sqlx::postgres::PgTypeInfo {
                <str as sqlx::Type<sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
                <str as sqlx::Type<sqlx::Postgres>>::compatible(ty)
            }
        }

        impl<'r> sqlx::Decode<'r, sqlx::Postgres> for $name {
            fn decode(
                value: sqlx::postgres::PgValueRef<'r>,
            ) -> Result<Self, sqlx::error::BoxDynError> {
                let raw = <&str as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
                Ok(raw.parse()?)
            }
        }

        impl<'q> sqlx::Encode<'q, sqlx::Postgres> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut sqlx::postgres::PgArgumentBuffer,
            ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
                <&str as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.as_str(), buf)
            }
        }

        impl From<$name> for crate::common::query_builder::SqlParam {
            fn from(v: $name) -> Self {
                crate::common::query_builder::SqlParam::Text(v.as_str().to_string())
            }
        }
    };
}

db_enum! {
    ConditionStatus("condition_status") {
        Registered => "REGISTERED",
        Unregistered => "UNREGISTERED",
    }
}

db_enum! {
    Currency("currency") {
        Jpy => "JPY",
        Usd => "USD",
        Lkr => "LKR",
    }
}

db_enum! {
    ShippingStatus("shipping_status") {
        Processing => "PROCESSING",
        Shipped => "SHIPPED",
        Arrived => "ARRIVED",
        Cleared => "CLEARED",
        Delivered => "DELIVERED",
    }
}

db_enum! {
    PurchaseStatus("purchase_status") {
        Pending => "PENDING",
        Confirmed => "CONFIRMED",
        LcPending => "LC_PENDING",
        LcIssued => "LC_ISSUED",
        PaymentPending => "PAYMENT_PENDING",
        PaymentCompleted => "PAYMENT_COMPLETED",
        Cancelled => "CANCELLED",
        Rejected => "REJECTED",
    }
}

db_enum! {
    SaleStatus("sale_status") {
        Available => "AVAILABLE",
        Reserved => "RESERVED",
        Sold => "SOLD",
        Cancelled => "CANCELLED",
    }
}

db_enum! {
    DocumentType("document_type") {
        Invoice => "INVOICE",
        Shipping => "SHIPPING",
        Customs => "CUSTOMS",
        Inspection => "INSPECTION",
        Registration => "REGISTRATION",
        Other => "OTHER",
    }
}

db_enum! {
    CustomerType("customer_type") {
        Individual => "INDIVIDUAL",
        Business => "BUSINESS",
    }
}

db_enum! {
    SupplierType("supplier_type") {
        Auction => "AUCTION",
        Dealer => "DEALER",
        Individual => "INDIVIDUAL",
    }
}

db_enum! {
    OrderStatus("order_status") {
        Draft => "DRAFT",
        Submitted => "SUBMITTED",
        Reviewing => "REVIEWING",
        Sourcing => "SOURCING",
        Confirmed => "CONFIRMED",
        Completed => "COMPLETED",
        Cancelled => "CANCELLED",
    }
}

db_enum! {
    OrderPriority("priority") {
        Low => "LOW",
        Normal => "NORMAL",
        High => "HIGH",
        Urgent => "URGENT",
    }
}

db_enum! {
    ShippingMethod("shipping_method") {
        Sea => "SEA",
        Air => "AIR",
    }
}

impl Default for ShippingStatus {
    fn default() -> Self {
        ShippingStatus::Processing
    }
}

impl Default for PurchaseStatus {
    fn default() -> Self {
        PurchaseStatus::Pending
    }
}

impl Default for SaleStatus {
    fn default() -> Self {
        SaleStatus::Available
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("sold".parse::<SaleStatus>().unwrap(), SaleStatus::Sold);
        assert_eq!(" lc_issued ".parse::<PurchaseStatus>().unwrap(), PurchaseStatus::LcIssued);
    }

    #[test]
    fn rejects_unknown_values_with_allowed_list() {
        let err = "LEASED".parse::<SaleStatus>().unwrap_err();
        assert_eq!(err.kind, "sale_status");
        assert!(err.to_string().contains("AVAILABLE, RESERVED, SOLD, CANCELLED"));
    }

    #[test]
    fn serde_uses_wire_values() {
        let json = serde_json::to_string(&PurchaseStatus::PaymentCompleted).unwrap();
        assert_eq!(json, "\"PAYMENT_COMPLETED\"");
        let back: Currency = serde_json::from_str("\"JPY\"").unwrap();
        assert_eq!(back, Currency::Jpy);
    }
}
