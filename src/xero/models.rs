//! Request payloads for the accounting API's create operations.
//!
//! Only the fields the bridge sends are modelled; everything Xero returns is
//! passed through as `serde_json::Value`.

use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct NewContacts {
    #[serde(rename = "Contacts")]
    pub contacts: Vec<NewContact>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct NewContact {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_address: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub phones: Vec<Phone>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Phone {
    pub phone_number: String,
    pub phone_type: PhoneType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PhoneType {
    Default,
    Ddi,
    Mobile,
    Fax,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewInvoices {
    #[serde(rename = "Invoices")]
    pub invoices: Vec<NewInvoice>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct NewInvoice {
    #[serde(rename = "Type")]
    pub invoice_type: InvoiceType,
    pub contact: ContactRef,
    pub line_items: Vec<LineItem>,
    pub date: NaiveDate,
    pub due_date: NaiveDate,
}

/// Accounts receivable (sales) or payable (bills).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum InvoiceType {
    Accrec,
    Accpay,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContactRef {
    #[serde(rename = "ContactID")]
    pub contact_id: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct LineItem {
    pub description: String,
    pub quantity: f64,
    pub unit_amount: f64,
    #[serde(rename = "AccountID")]
    pub account_id: String,
}

/// The demo contact created by `POST /contacts`.
pub fn sample_contact() -> NewContacts {
    NewContacts {
        contacts: vec![NewContact {
            name: "Bruce Banner".to_string(),
            email_address: Some("hulk@avengers.com".to_string()),
            phones: vec![Phone {
                phone_number: "555-555-5555".to_string(),
                phone_type: PhoneType::Mobile,
            }],
        }],
    }
}

/// A one-line consulting invoice for `POST /invoices`.
pub fn sample_invoice(contact_id: String, account_id: String, date: NaiveDate) -> NewInvoices {
    NewInvoices {
        invoices: vec![NewInvoice {
            invoice_type: InvoiceType::Accrec,
            contact: ContactRef { contact_id },
            line_items: vec![LineItem {
                description: "consulting".to_string(),
                quantity: 1.0,
                unit_amount: 10.0,
                account_id,
            }],
            date,
            due_date: date.succ_opt().unwrap_or(date),
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_contact_wire_format() {
        let body = serde_json::to_value(sample_contact()).unwrap();
        assert_eq!(
            body,
            json!({
                "Contacts": [{
                    "Name": "Bruce Banner",
                    "EmailAddress": "hulk@avengers.com",
                    "Phones": [{"PhoneNumber": "555-555-5555", "PhoneType": "MOBILE"}]
                }]
            })
        );
    }

    #[test]
    fn test_invoice_wire_format() {
        let date = NaiveDate::from_ymd_opt(2021, 9, 24).unwrap();
        let body = serde_json::to_value(sample_invoice("c-1".into(), "a-1".into(), date)).unwrap();
        let invoice = &body["Invoices"][0];

        assert_eq!(invoice["Type"], "ACCREC");
        assert_eq!(invoice["Contact"]["ContactID"], "c-1");
        assert_eq!(invoice["Date"], "2021-09-24");
        assert_eq!(invoice["DueDate"], "2021-09-25");
        assert_eq!(invoice["LineItems"][0]["AccountID"], "a-1");
        assert_eq!(invoice["LineItems"][0]["Quantity"], 1.0);
        assert_eq!(invoice["LineItems"][0]["UnitAmount"], 10.0);
    }
}
