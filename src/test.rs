//! Shared test fixtures.
//!
//! This module is only compiled when running tests (`#[cfg(test)]`).

/// A donations sheet the way a Google Form actually publishes one: renamed headers,
/// currency markers, a blank line and a quoted name containing a comma.
pub fn donation_csv() -> &'static str {
    "Timestamp,Donor Name,Donation Amount (LKR),Receipt Link\n\
     1/5/2024 10:15:00,\"Perera, Nimal\",\"LKR 1,500\",https://example.com/r/1\n\
     1/6/2024 09:00:00,Anusha,Rs. 2000,https://example.com/r/2\n\
     ,,,\n\
     1/7/2024 18:30:00,,500,\n"
}

/// An expenses sheet with an attachment column that only the contains fallback can find.
pub fn expense_csv() -> &'static str {
    "Timestamp,Expense Date,Expense Title,Category,Description,Amount (LKR),Receipt,Remarks,Upload Invoice,Photos (if available)\n\
     1/5/2024 10:15:00,2024-01-04,Paint,Supplies,\"Wall paint, brushes\",2500,,first batch,https://example.com/inv/1,\n\
     1/6/2024 09:00:00,2024-01-05,Venue cleanup,Logistics,,0,,volunteers did it,,https://example.com/p/1\n"
}
