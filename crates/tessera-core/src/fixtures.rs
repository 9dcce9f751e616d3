//! Sample catalogs for tests, documentation and local experiments.

use crate::model::{Attribute, CatalogData, Category, DataType, Event, Product};

const IP_ADDRESS_PATTERN: &str = r"(([0-9]|[1-9][0-9]|1[0-9]{2}|2[0-4][0-9]|25[0-5])\.){3}([0-9]|[1-9][0-9]|1[0-9]{2}|2[0-4][0-9]|25[0-5])";

/// A small retail banking catalog.
///
/// Request-context attributes: `accountNumber`, `userId` and `loginId` are
/// required everywhere; `companyId` and `ipAddress` are optional globally but
/// required by the `transfer` event; `hostName` is optional.
///
/// Events: `login` (no attributes), `transfer` (`toAccount`, `fromAccount`,
/// `amount`), `deposit` (`account`, `amount`) and `billPay` (`fromAccount`,
/// `payee`, `amount`, optional `memo`).
#[must_use]
pub fn banking_catalog() -> CatalogData {
    CatalogData::new()
        .with_product(
            Product::new("banking", "Banking", "Fictional banking product")
                .event("login")
                .event("transfer")
                .event("deposit")
                .event("billPay"),
        )
        .with_category(
            Category::new("account", "Account", "Events related to accounts")
                .event("transfer")
                .event("deposit"),
        )
        .with_category(
            Category::new("billPay", "Bill Pay", "Events related to bill payment").event("billPay"),
        )
        .with_attribute(
            Attribute::new("accountNumber")
                .display_name("Account Number")
                .description("Company account number")
                .data_type(DataType::Int)
                .indexed(true, true)
                .required(true)
                .request_context(true),
        )
        .with_attribute(
            Attribute::new("companyId")
                .display_name("Company Id")
                .description("Id of the company")
                .data_type(DataType::Int)
                .indexed(true, true)
                .request_context(true)
                .constraint("pattern", "[0-9]+"),
        )
        .with_attribute(
            Attribute::new("ipAddress")
                .display_name("IP Address")
                .description("IP Address of the caller")
                .indexed(true, true)
                .request_context(true)
                .constraint("pattern", IP_ADDRESS_PATTERN),
        )
        .with_attribute(
            Attribute::new("userId")
                .display_name("UserId")
                .description("Id of the User")
                .data_type(DataType::Int)
                .indexed(true, true)
                .required(true)
                .request_context(true),
        )
        .with_attribute(
            Attribute::new("loginId")
                .display_name("LoginId")
                .description("Id user logs in with")
                .indexed(true, true)
                .required(true)
                .request_context(true),
        )
        .with_attribute(
            Attribute::new("hostName")
                .display_name("Host Name")
                .description("Name of the server")
                .indexed(true, true)
                .request_context(true),
        )
        .with_attribute(
            Attribute::new("toAccount")
                .display_name("To Account Number")
                .description("Destination account")
                .data_type(DataType::Int)
                .required(true)
                .constraint("minValue", "1"),
        )
        .with_attribute(
            Attribute::new("fromAccount")
                .display_name("From Account Number")
                .description("Source of funds")
                .data_type(DataType::Int)
                .required(true),
        )
        .with_attribute(
            Attribute::new("amount")
                .display_name("Amount")
                .description("Amount to transfer")
                .data_type(DataType::BigDecimal)
                .required(true),
        )
        .with_attribute(
            Attribute::new("account")
                .display_name("Account Number")
                .description("Account number")
                .data_type(DataType::Int)
                .required(true),
        )
        .with_attribute(
            Attribute::new("payee")
                .display_name("Payee")
                .description("Recipient of payment")
                .required(true),
        )
        .with_attribute(
            Attribute::new("memo")
                .display_name("Memo")
                .description("Free text note")
                .constraint("maxLength", "20"),
        )
        .with_event(Event::new("login").display_name("Login").description("User Login"))
        .with_event(
            Event::new("transfer")
                .display_name("Transfer")
                .description("Transfer between accounts")
                .attribute_required("toAccount", true)
                .attribute_required("fromAccount", true)
                .attribute_required("amount", true)
                .attribute("accountNumber")
                .attribute_required("companyId", true)
                .attribute("userId")
                .attribute_required("ipAddress", true)
                .attribute("loginId"),
        )
        .with_event(
            Event::new("deposit")
                .display_name("Deposit")
                .description("Deposit funds")
                .attribute_required("account", true)
                .attribute_required("amount", true),
        )
        .with_event(
            Event::new("billPay")
                .display_name("Bill Pay")
                .description("Payment of a bill")
                .attribute_required("fromAccount", true)
                .attribute_required("payee", true)
                .attribute_required("amount", true)
                .attribute("memo"),
        )
}

/// A catalog with a single `login` event and no attributes at all.
#[must_use]
pub fn basic_catalog() -> CatalogData {
    CatalogData::new().with_event(Event::new("login").display_name("Login").description("User Login"))
}
