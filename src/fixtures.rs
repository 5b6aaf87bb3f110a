//! Demonstration data loaded into the in-memory store at startup.

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::models::{Agency, Conversation, Message, PlatformSettings, Role, SocialMedia, User};

fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, mo, d, h, mi, s)
        .single()
        .unwrap_or_default()
}

fn some(s: &str) -> Option<String> {
    Some(s.to_string())
}

pub fn categories() -> Vec<String> {
    [
        "Residential",
        "Commercial",
        "Industrial",
        "Land",
        "Property Management",
        "Luxury",
        "Investment",
        "International",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

/// Seed accounts, one per role. The agency account manages agency "1".
pub fn users() -> Vec<User> {
    let joined = at(2023, 8, 1, 9, 0, 0);
    vec![
        User {
            id: "1".to_string(),
            email: "admin@realestate.com".to_string(),
            name: "Admin User".to_string(),
            role: Role::Admin,
            agency_id: None,
            created_at: joined,
        },
        User {
            id: "2".to_string(),
            email: "agency@realestate.com".to_string(),
            name: "Agency User".to_string(),
            role: Role::Agency,
            agency_id: some("1"),
            created_at: joined,
        },
        User {
            id: "3".to_string(),
            email: "user@realestate.com".to_string(),
            name: "Regular User".to_string(),
            role: Role::Visitor,
            agency_id: None,
            created_at: joined,
        },
    ]
}

struct Seed {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    website: &'static str,
    email: &'static str,
    phone: &'static str,
    address: &'static str,
    city: &'static str,
    state: Option<&'static str>,
    zip_code: Option<&'static str>,
    country: &'static str,
    category: &'static [&'static str],
    social_media: SocialMedia,
    created_at: DateTime<Utc>,
}

impl From<Seed> for Agency {
    fn from(seed: Seed) -> Self {
        Agency {
            id: seed.id.to_string(),
            name: seed.name.to_string(),
            description: some(seed.description),
            logo: None,
            website: some(seed.website),
            email: seed.email.to_string(),
            phone: seed.phone.to_string(),
            address: seed.address.to_string(),
            city: seed.city.to_string(),
            state: seed.state.map(String::from),
            zip_code: seed.zip_code.map(String::from),
            country: seed.country.to_string(),
            category: seed.category.iter().map(|c| c.to_string()).collect(),
            social_media: seed.social_media,
            created_at: seed.created_at,
            updated_at: seed.created_at,
        }
    }
}

pub fn agencies() -> Vec<Agency> {
    let seeds = vec![
        Seed {
            id: "1",
            name: "Skyline Properties",
            description: "A leading residential and commercial real estate agency with over 20 years of experience in the market.",
            website: "https://skylineproperties.com",
            email: "info@skylineproperties.com",
            phone: "+1 (555) 123-4567",
            address: "123 Main Street",
            city: "New York",
            state: Some("NY"),
            zip_code: Some("10001"),
            country: "United States",
            category: &["Residential", "Commercial"],
            social_media: SocialMedia {
                facebook: some("https://facebook.com/skylineproperties"),
                instagram: some("https://instagram.com/skylineproperties"),
                ..SocialMedia::default()
            },
            created_at: at(2023, 8, 15, 14, 23, 45),
        },
        Seed {
            id: "2",
            name: "City Living Real Estate",
            description: "Specialized in urban properties and luxury apartments in metropolitan areas.",
            website: "https://cityliving.com",
            email: "contact@cityliving.com",
            phone: "+1 (555) 987-6543",
            address: "456 Urban Avenue",
            city: "Toronto",
            state: Some("ON"),
            zip_code: Some("M5V 2A8"),
            country: "Canada",
            category: &["Residential", "Luxury"],
            social_media: SocialMedia {
                instagram: some("https://instagram.com/cityliving"),
                linkedin: some("https://linkedin.com/company/cityliving"),
                ..SocialMedia::default()
            },
            created_at: at(2023, 8, 12, 9, 15, 22),
        },
        Seed {
            id: "3",
            name: "Global Investments",
            description: "International real estate investment firm focusing on commercial properties and development opportunities.",
            website: "https://globalinvest.com",
            email: "investors@globalinvest.com",
            phone: "+44 20 1234 5678",
            address: "10 Financial Square",
            city: "London",
            state: None,
            zip_code: None,
            country: "United Kingdom",
            category: &["Investment", "Commercial", "International"],
            social_media: SocialMedia {
                linkedin: some("https://linkedin.com/company/globalinvestments"),
                twitter: some("https://twitter.com/globalinvestments"),
                ..SocialMedia::default()
            },
            created_at: at(2023, 8, 10, 16, 42, 10),
        },
        Seed {
            id: "4",
            name: "Premium Properties",
            description: "Luxury real estate specialists with a portfolio of exclusive properties in prime locations.",
            website: "https://premiumproperties.com.au",
            email: "hello@premiumproperties.com.au",
            phone: "+61 2 9876 5432",
            address: "25 Harbor View",
            city: "Sydney",
            state: Some("NSW"),
            zip_code: Some("2000"),
            country: "Australia",
            category: &["Luxury", "Residential"],
            social_media: SocialMedia {
                facebook: some("https://facebook.com/premiumproperties"),
                instagram: some("https://instagram.com/premiumproperties"),
                ..SocialMedia::default()
            },
            created_at: at(2023, 8, 8, 11, 30, 0),
        },
        Seed {
            id: "5",
            name: "Industrial Spaces",
            description: "Specialized in industrial real estate, warehouses, and manufacturing facilities.",
            website: "https://industrialspaces.net",
            email: "info@industrialspaces.net",
            phone: "+1 (555) 234-5678",
            address: "789 Factory Road",
            city: "Chicago",
            state: Some("IL"),
            zip_code: Some("60607"),
            country: "United States",
            category: &["Industrial", "Commercial"],
            social_media: SocialMedia::default(),
            created_at: at(2023, 8, 5, 13, 45, 30),
        },
        Seed {
            id: "6",
            name: "Land Development Co.",
            description: "Specialists in land acquisition and development for residential and commercial projects.",
            website: "https://landdevelopment.co",
            email: "projects@landdevelopment.co",
            phone: "+1 (555) 876-5432",
            address: "567 Opportunity Drive",
            city: "Phoenix",
            state: Some("AZ"),
            zip_code: Some("85001"),
            country: "United States",
            category: &["Land", "Investment"],
            social_media: SocialMedia {
                linkedin: some("https://linkedin.com/company/landdevelopment"),
                ..SocialMedia::default()
            },
            created_at: at(2023, 8, 3, 10, 20, 15),
        },
    ];

    seeds.into_iter().map(Agency::from).collect()
}

/// Two threads for the visitor account, timestamped relative to startup.
/// City Living has no managing account, so its reply carries a placeholder sender.
pub fn conversations() -> Vec<Conversation> {
    let now = Utc::now();
    let msg = |id: &str, sender: &str, text: &str, ago: Duration| Message {
        id: id.to_string(),
        sender_id: sender.to_string(),
        text: text.to_string(),
        timestamp: now - ago,
    };

    vec![
        Conversation {
            id: "1".to_string(),
            viewer_id: "3".to_string(),
            agency_id: "1".to_string(),
            agency_name: "Skyline Properties".to_string(),
            messages: vec![
                msg(
                    "m1",
                    "2",
                    "Hello, I saw your interest in one of our properties. How can I help you?",
                    Duration::hours(2),
                ),
                msg(
                    "m2",
                    "3",
                    "Hi! Yes, I was wondering if the property is still available?",
                    Duration::hours(1),
                ),
                msg(
                    "m3",
                    "2",
                    "Yes, it's still available. Would you like to schedule a viewing?",
                    Duration::minutes(30),
                ),
            ],
        },
        Conversation {
            id: "2".to_string(),
            viewer_id: "3".to_string(),
            agency_id: "2".to_string(),
            agency_name: "City Living Real Estate".to_string(),
            messages: vec![
                msg(
                    "m4",
                    "3",
                    "I'm interested in listing my property with your agency. What are your rates?",
                    Duration::hours(24),
                ),
                msg(
                    "m5",
                    "agency-2",
                    "Thanks for reaching out! Our standard commission rate is 2.5%. Would you like to arrange a consultation?",
                    Duration::hours(23),
                ),
            ],
        },
    ]
}

pub fn default_settings() -> PlatformSettings {
    PlatformSettings {
        platform_name: "RealEstate Hub".to_string(),
        contact_email: "info@realestatehub.com".to_string(),
        allow_signups: true,
        require_approval: true,
        max_categories: 5,
        enable_analytics: true,
        primary_color: "#3B82F6".to_string(),
        logo_url: "/logo.png".to_string(),
        enable_dark_mode: true,
    }
}
