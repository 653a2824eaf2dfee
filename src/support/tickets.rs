use chrono::{DateTime, Datelike, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::store::TicketRecord;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CreateTicketRequest {
    pub customer_email: String,
    pub issue_type: String,
    pub description: String,
    #[serde(default = "default_priority")]
    pub priority: String,
    #[serde(default)]
    pub booking_reference: Option<String>,
}

fn default_priority() -> String {
    "medium".to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueType {
    DamageClaim,
    BookingChange,
    Complaint,
    CleaningIssue,
    General,
}

impl IssueType {
    pub const ALL: [IssueType; 5] = [
        IssueType::DamageClaim,
        IssueType::BookingChange,
        IssueType::Complaint,
        IssueType::CleaningIssue,
        IssueType::General,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IssueType::DamageClaim => "damage_claim",
            IssueType::BookingChange => "booking_change",
            IssueType::Complaint => "complaint",
            IssueType::CleaningIssue => "cleaning_issue",
            IssueType::General => "general",
        }
    }

    /// Swedish name used in customer replies
    pub fn display_name(&self) -> &'static str {
        match self {
            IssueType::DamageClaim => "skadeanmälan",
            IssueType::BookingChange => "bokningsändring",
            IssueType::Complaint => "klagomål",
            IssueType::CleaningIssue => "städningsproblem",
            IssueType::General => "allmän fråga",
        }
    }

    pub fn assigned_team(&self) -> &'static str {
        match self {
            IssueType::DamageClaim => "Claims Department",
            IssueType::BookingChange => "Booking Team",
            IssueType::Complaint => "Customer Relations",
            IssueType::CleaningIssue => "Quality Control",
            IssueType::General => "Customer Service",
        }
    }

    fn follow_up(&self) -> &'static str {
        match self {
            IssueType::DamageClaim => "Vår skadeavdelning kommer att kontakta dig med information om nästa steg, inklusive eventuell dokumentation som behövs.",
            IssueType::BookingChange => "Vårt bokningsteam kommer att bekräfta dina ändringar och uppdatera din bokning.",
            IssueType::Complaint => "Vi tar alla klagomål på allvar. En kundrelationsansvarig kommer att kontakta dig för att lösa situationen.",
            IssueType::CleaningIssue => "Vårt kvalitetsteam kommer att granska ärendet och eventuellt schemalägga en ny städning om det behövs.",
            IssueType::General => "En kundservicemedarbetare kommer att hantera ditt ärende.",
        }
    }

    pub fn valid_values() -> String {
        Self::ALL.iter().map(|t| t.as_str()).collect::<Vec<_>>().join(", ")
    }
}

impl FromStr for IssueType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("Invalid issue type. Must be one of: {}", Self::valid_values()))
    }
}

impl fmt::Display for IssueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }

    pub fn estimated_response(&self) -> &'static str {
        match self {
            Priority::High => "inom 2 timmar",
            Priority::Medium => "inom 24 timmar",
            Priority::Low => "inom 2 arbetsdagar",
        }
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            _ => Err("Invalid priority. Must be one of: high, medium, low".to_string()),
        }
    }
}

/// Ticket request after validation
#[derive(Debug, Clone, PartialEq)]
pub struct NewTicket {
    pub customer_email: String,
    pub issue_type: IssueType,
    pub priority: Priority,
    pub description: String,
    pub booking_reference: Option<String>,
}

impl TryFrom<CreateTicketRequest> for NewTicket {
    type Error = String;

    fn try_from(req: CreateTicketRequest) -> Result<Self, Self::Error> {
        if req.description.trim().is_empty() {
            return Err("description must not be empty".to_string());
        }
        if !super::is_valid_email(&req.customer_email) {
            return Err("Invalid email format".to_string());
        }
        Ok(Self {
            issue_type: req.issue_type.parse()?,
            priority: req.priority.parse()?,
            customer_email: req.customer_email,
            description: req.description,
            booking_reference: req.booking_reference,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TicketData {
    pub ticket_id: String,
    pub ticket_number: String,
    pub estimated_response: String,
    pub assigned_team: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateTicketResponse {
    pub ticket_created: bool,
    pub ticket_data: TicketData,
    pub suggested_response: String,
}

/// `NF-<year>-<four digits>`
pub fn generate_ticket_number<R: Rng>(rng: &mut R, now: DateTime<Utc>) -> String {
    format!("NF-{}-{}", now.year(), rng.gen_range(1000..=9999))
}

pub fn ticket_id(email: &str, now: DateTime<Utc>) -> String {
    let prefix: String = email.chars().take(5).collect();
    format!("ticket-{}-{}", now.timestamp_millis(), prefix)
}

impl NewTicket {
    pub fn to_record(&self, ticket_number: &str, now: DateTime<Utc>) -> TicketRecord {
        TicketRecord {
            ticket_number: ticket_number.to_string(),
            customer_email: self.customer_email.clone(),
            issue_type: self.issue_type.as_str().to_string(),
            description: self.description.clone(),
            priority: self.priority.as_str().to_string(),
            booking_reference: self.booking_reference.clone(),
            status: "open".to_string(),
            assigned_team: self.issue_type.assigned_team().to_string(),
            created_by: "ai_customer_service".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn response(&self, ticket_number: &str, now: DateTime<Utc>) -> CreateTicketResponse {
        let suggested_response = format!(
            "Jag har skapat ärende {} för din {}. Du får email {} med mer information. {}",
            ticket_number,
            self.issue_type.display_name(),
            self.priority.estimated_response(),
            self.issue_type.follow_up()
        );

        CreateTicketResponse {
            ticket_created: true,
            ticket_data: TicketData {
                ticket_id: ticket_id(&self.customer_email, now),
                ticket_number: ticket_number.to_string(),
                estimated_response: self.priority.estimated_response().to_string(),
                assigned_team: self.issue_type.assigned_team().to_string(),
            },
            suggested_response,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn request(issue_type: &str, priority: &str) -> CreateTicketRequest {
        CreateTicketRequest {
            customer_email: "anna.svensson@gmail.com".to_string(),
            issue_type: issue_type.to_string(),
            description: "Repa på byrån".to_string(),
            priority: priority.to_string(),
            booking_reference: Some("BK-2024-001234".to_string()),
        }
    }

    #[test]
    fn test_issue_type_parsing() {
        assert_eq!("damage_claim".parse::<IssueType>(), Ok(IssueType::DamageClaim));
        let err = "lost_cat".parse::<IssueType>().unwrap_err();
        assert!(err.contains("damage_claim, booking_change, complaint, cleaning_issue, general"));
    }

    #[test]
    fn test_new_ticket_validation() {
        assert!(NewTicket::try_from(request("complaint", "high")).is_ok());
        assert!(NewTicket::try_from(request("complaint", "urgent")).is_err());
        assert!(NewTicket::try_from(request("refund", "low")).is_err());

        let mut blank = request("general", "low");
        blank.description = "   ".to_string();
        assert!(NewTicket::try_from(blank).is_err());
    }

    #[test]
    fn test_new_ticket_rejects_bad_email() {
        let mut req = request("general", "low");
        req.customer_email = "not-an-email".to_string();
        assert_eq!(NewTicket::try_from(req).unwrap_err(), "Invalid email format");
    }

    #[test]
    fn test_default_priority_is_medium() {
        let req: CreateTicketRequest = serde_json::from_value(serde_json::json!({
            "customer_email": "a@b.se",
            "issue_type": "general",
            "description": "Hej"
        }))
        .unwrap();
        assert_eq!(NewTicket::try_from(req).unwrap().priority, Priority::Medium);
    }

    #[test]
    fn test_ticket_number_format() {
        let mut rng = StdRng::seed_from_u64(7);
        let now = Utc.with_ymd_and_hms(2025, 3, 9, 10, 0, 0).unwrap();
        for _ in 0..50 {
            let number = generate_ticket_number(&mut rng, now);
            let digits: u32 = number.strip_prefix("NF-2025-").unwrap().parse().unwrap();
            assert!((1000..=9999).contains(&digits));
        }
    }

    #[test]
    fn test_ticket_id_uses_email_prefix() {
        let now = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        assert_eq!(ticket_id("anna.svensson@gmail.com", now), "ticket-1700000000123-anna.");
        assert_eq!(ticket_id("å@b", now), "ticket-1700000000123-å@b");
    }

    #[test]
    fn test_response_routes_to_team() {
        let ticket = NewTicket::try_from(request("damage_claim", "high")).unwrap();
        let now = Utc::now();
        let response = ticket.response("NF-2025-1111", now);

        assert_eq!(response.ticket_data.assigned_team, "Claims Department");
        assert_eq!(response.ticket_data.estimated_response, "inom 2 timmar");
        assert!(response
            .suggested_response
            .starts_with("Jag har skapat ärende NF-2025-1111 för din skadeanmälan."));

        let record = ticket.to_record("NF-2025-1111", now);
        assert_eq!(record.status, "open");
        assert_eq!(record.issue_type, "damage_claim");
        assert_eq!(record.assigned_team, "Claims Department");
    }
}
