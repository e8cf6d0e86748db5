//! Column headings of the accounting exports.

/// Payment export: donor or institution name.
pub const PAYEE: &str = "Payee";
/// Transaction type in both the payment and bill exports.
pub const TYPE: &str = "Type";
/// Payment export: transaction date.
pub const DATE: &str = "Date";
/// Payment export: amount received or paid.
pub const PAYMENT: &str = "Payment";
/// Free-text memo; carries the scholarship recipient on grant rows.
pub const MEMO: &str = "Memo";

/// Bill export: date the bill was entered.
pub const BILL_DATE: &str = "Bill date";
/// Bill export: institution the bill is owed to.
pub const VENDOR: &str = "Vendor";
/// Bill export: billed amount. Exports that head this column `Bills` set
/// `grants.bill_amount_column` instead.
pub const BILL_AMOUNT: &str = "Amount";

/// Address list: donor display name.
pub const NAME: &str = "Name";
pub const STREET: &str = "Street";
pub const CITY: &str = "City";
pub const STATE: &str = "State";
pub const ZIP: &str = "Zip";
pub const EMAIL: &str = "Email";
/// Address list: number of people in the household.
pub const HOUSEHOLD: &str = "Household";
