/// Instruction prefix for free-form document analysis. The document text is
/// appended as the payload.
pub const DOCUMENT_ANALYSIS_PREFIX: &str = "Analyze this financial document:\n\
     1. Identify key financial trends\n\
     2. Highlight potential risks\n\
     3. Calculate important ratios (ROE, ROI, Debt/Equity)\n\
     4. Provide investment recommendations\n\n";

fn pretty(skeleton: serde_json::Value) -> String {
    serde_json::to_string_pretty(&skeleton).unwrap_or_default()
}

/// JSON skeleton the model fills in for a stock outlook.
pub fn stock_outlook_schema() -> String {
    pretty(serde_json::json!({
        "current_analysis": {
            "valuation": "",
            "technical_analysis": "",
            "fundamentals": ""
        },
        "predictions": {
            "1_week": "",
            "1_month": "",
            "1_year": ""
        },
        "recommendation": ""
    }))
}

/// JSON skeleton the model fills in for a receipt.
pub fn expense_schema() -> String {
    pretty(serde_json::json!({
        "vendor": "",
        "date": "YYYY-MM-DD",
        "amount": 0.00,
        "category": "",
        "tax_details": {
            "gst": 0.00,
            "total_tax": 0.00
        }
    }))
}

/// JSON skeleton the model fills in for a fraud scan.
pub fn fraud_schema() -> String {
    pretty(serde_json::json!({
        "risk_level": "low/medium/high",
        "suspicious_patterns": [],
        "recommended_actions": []
    }))
}

pub fn stock_outlook_prompt(ticker: &str) -> String {
    format!(
        "Analyze {ticker} stock. Respond with ONLY a JSON object in this shape:\n{}",
        stock_outlook_schema()
    )
}

pub fn expense_prompt(receipt_text: &str) -> String {
    format!(
        "Analyze expense receipt. Respond with ONLY a JSON object in this shape:\n{}\n\
         Text: {receipt_text}",
        expense_schema()
    )
}

pub fn fraud_prompt(transactions: &str) -> String {
    format!(
        "Detect financial fraud risks in:\n{transactions}\nOutput JSON with:\n{}",
        fraud_schema()
    )
}
