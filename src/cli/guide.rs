//! Static guidance printed by the `keys` and `recommendations` commands

use colored::Colorize;

const RULE: &str = "============================================================";

pub fn keys() {
    println!("{}", RULE);
    println!("{}", "HOW TO GENERATE API KEYS".bold());
    println!("{}", RULE);
    println!("1. Login to ERPNext web interface");
    println!("2. Go to Settings → My Settings");
    println!("3. Scroll to 'API Access' section");
    println!("4. Click 'Generate Keys'");
    println!("5. Copy the API Key and API Secret");
    println!("6. Store them securely (environment variables recommended)");
    println!();
    println!("Environment Variables:");
    println!("{}", "export ERPNEXT_API_KEY='your_api_key_here'".cyan());
    println!("{}", "export ERPNEXT_API_SECRET='your_api_secret_here'".cyan());
    println!("{}", RULE);
}

const RECOMMENDED: [&str; 10] = [
    "USE API TOKENS for server-to-server communication",
    "USE HTTPS in production (never HTTP)",
    "STORE credentials in environment variables",
    "IMPLEMENT rate limiting",
    "LOG all API access for audit trails",
    "ROTATE API keys regularly (every 90 days)",
    "USE IP whitelisting when possible",
    "IMPLEMENT proper error handling",
    "VALIDATE all inputs",
    "MONITOR for unusual access patterns",
];

const AVOID: [&str; 5] = [
    "Never commit API keys to version control",
    "Never use Basic Auth in production",
    "Never use HTTP in production",
    "Never expose API keys in logs",
    "Never use session cookies for mobile apps",
];

pub fn recommendations() {
    println!("{}", RULE);
    println!("{}", "SECURITY RECOMMENDATIONS".bold());
    println!("{}", RULE);
    for (i, item) in RECOMMENDED.iter().enumerate() {
        println!("{}. {} {}", i + 1, "✓".green(), item);
    }
    println!();
    println!("{}", "AVOID:".red().bold());
    for item in AVOID {
        println!("- {}", item);
    }
    println!("{}", RULE);
}
