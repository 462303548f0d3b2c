// src/services/reference_data.rs
use serde::{Deserialize, Serialize};

/// A listed company used as a valuation benchmark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparableCompany {
    pub name: String,
    pub pe: f64,
    pub ev_ebit: f64,
    pub ev_ebitda: f64,
}

impl ComparableCompany {
    pub fn new(name: impl Into<String>, pe: f64, ev_ebit: f64, ev_ebitda: f64) -> Self {
        ComparableCompany {
            name: name.into(),
            pe,
            ev_ebit,
            ev_ebitda,
        }
    }
}

/// Source of the lookup tables the valuation formulas depend on.
///
/// `StaticReferenceData` carries the tables shipped with the site; other
/// implementations can load them from elsewhere without touching the formulas.
pub trait ReferenceData: Send + Sync {
    /// Comparables for an exact (industry, country) pair, `None` when the pair is not tabulated.
    fn comparables(&self, industry: &str, country: &str) -> Option<Vec<ComparableCompany>>;
    fn industry_rd_factor(&self, industry: &str) -> f64;
    fn country_rd_factor(&self, country: &str) -> f64;
    fn industry_royalty_rate(&self, industry: &str) -> f64;
    fn country_royalty_rate(&self, country: &str) -> f64;
    fn industries(&self) -> &[&'static str];
    fn countries(&self) -> &[&'static str];
}

const DEFAULT_RD_FACTOR: f64 = 1.0;
const DEFAULT_INDUSTRY_ROYALTY_RATE: f64 = 5.0;
const DEFAULT_COUNTRY_ROYALTY_RATE: f64 = 6.0;

type Row = (&'static str, f64, f64, f64);

// (industry, country, companies)
const COMPARABLES: &[(&str, &str, [Row; 3])] = &[
    ("Technology", "United States", [
        ("Apple Inc.", 28.5, 22.1, 18.3),
        ("Microsoft Corp.", 32.1, 25.4, 21.7),
        ("Google (Alphabet)", 24.8, 19.6, 16.2),
    ]),
    ("Technology", "Germany", [
        ("SAP SE", 26.3, 20.8, 17.1),
        ("Siemens AG", 18.7, 14.2, 11.9),
        ("Software AG", 22.1, 17.5, 14.3),
    ]),
    ("Technology", "China", [
        ("Alibaba Group", 15.2, 12.8, 10.4),
        ("Tencent Holdings", 19.6, 16.3, 13.7),
        ("Baidu Inc.", 13.4, 10.9, 8.7),
    ]),
    ("Healthcare", "United States", [
        ("Johnson & Johnson", 16.8, 13.2, 11.5),
        ("Pfizer Inc.", 14.3, 11.7, 9.8),
        ("Merck & Co.", 18.9, 15.1, 12.6),
    ]),
    ("Healthcare", "Germany", [
        ("Bayer AG", 12.4, 9.8, 8.2),
        ("Fresenius SE", 15.7, 12.3, 10.1),
        ("Sartorius AG", 22.6, 18.9, 15.7),
    ]),
    ("Healthcare", "Switzerland", [
        ("Roche Holding", 17.2, 14.1, 11.8),
        ("Novartis AG", 19.5, 16.3, 13.4),
        ("Lonza Group", 24.1, 20.7, 17.2),
    ]),
    ("Automotive", "United States", [
        ("Tesla Inc.", 45.2, 38.7, 32.1),
        ("Ford Motor Co.", 8.3, 6.7, 5.4),
        ("General Motors", 7.9, 6.2, 5.1),
    ]),
    ("Automotive", "Germany", [
        ("BMW AG", 6.8, 5.4, 4.7),
        ("Mercedes-Benz", 7.2, 5.8, 4.9),
        ("Volkswagen AG", 5.9, 4.6, 3.8),
    ]),
    ("Automotive", "Japan", [
        ("Toyota Motor", 9.1, 7.3, 6.2),
        ("Honda Motor", 8.7, 6.9, 5.8),
        ("Nissan Motor", 6.4, 5.1, 4.3),
    ]),
    ("Banking", "United States", [
        ("JPMorgan Chase", 11.2, 8.9, 7.4),
        ("Bank of America", 10.8, 8.5, 7.1),
        ("Wells Fargo", 9.7, 7.6, 6.3),
    ]),
    ("Banking", "United Kingdom", [
        ("HSBC Holdings", 8.9, 7.1, 5.9),
        ("Barclays PLC", 7.3, 5.8, 4.7),
        ("Lloyds Banking", 6.8, 5.4, 4.2),
    ]),
    ("Banking", "Germany", [
        ("Deutsche Bank", 5.2, 4.1, 3.3),
        ("Commerzbank", 4.8, 3.7, 2.9),
        ("DZ Bank", 6.1, 4.8, 3.9),
    ]),
    ("Pharmaceuticals", "United States", [
        ("Eli Lilly", 35.2, 28.7, 24.1),
        ("AbbVie Inc.", 18.6, 15.3, 12.8),
        ("Bristol Myers", 22.4, 18.7, 15.6),
    ]),
    ("Pharmaceuticals", "Switzerland", [
        ("Roche Holding", 17.2, 14.1, 11.8),
        ("Novartis AG", 19.5, 16.3, 13.4),
        ("Lonza Group", 24.1, 20.7, 17.2),
    ]),
    ("Pharmaceuticals", "Germany", [
        ("Bayer AG", 12.4, 9.8, 8.2),
        ("Fresenius SE", 15.7, 12.3, 10.1),
        ("Sartorius AG", 22.6, 18.9, 15.7),
    ]),
];

const INDUSTRY_RD_FACTORS: &[(&str, f64)] = &[
    ("Technology", 1.5),
    ("Pharmaceuticals", 1.8),
    ("Biotechnology", 2.0),
    ("Aerospace & Defense", 1.6),
    ("Automotive", 1.3),
    ("Healthcare", 1.4),
    ("Banking", 0.8),
    ("Retail", 0.6),
    ("Construction", 0.7),
    ("Energy", 1.2),
];

const COUNTRY_RD_FACTORS: &[(&str, f64)] = &[
    ("United States", 1.3),
    ("Germany", 1.2),
    ("Japan", 1.1),
    ("Switzerland", 1.4),
    ("South Korea", 1.1),
    ("China", 1.0),
    ("United Kingdom", 1.1),
    ("France", 1.0),
    ("Canada", 1.0),
    ("Netherlands", 1.1),
];

const INDUSTRY_ROYALTY_RATES: &[(&str, f64)] = &[
    ("Technology", 8.5),
    ("Pharmaceuticals", 12.0),
    ("Biotechnology", 15.0),
    ("Aerospace & Defense", 6.0),
    ("Automotive", 4.5),
    ("Healthcare", 10.0),
    ("Banking", 2.0),
    ("Retail", 3.0),
    ("Construction", 2.5),
    ("Energy", 5.0),
];

const COUNTRY_ROYALTY_RATES: &[(&str, f64)] = &[
    ("United States", 8.0),
    ("Germany", 7.5),
    ("Japan", 6.5),
    ("Switzerland", 9.0),
    ("South Korea", 6.0),
    ("China", 5.5),
    ("United Kingdom", 7.0),
    ("France", 6.8),
    ("Canada", 6.5),
    ("Netherlands", 7.2),
];

pub const INDUSTRIES: &[&str] = &[
    "Aerospace & Defense", "Agriculture", "Airlines", "Alternative Energy", "Apparel & Fashion",
    "Architecture & Planning", "Arts & Crafts", "Automotive", "Aviation & Aerospace", "Banking",
    "Biotechnology", "Broadcast Media", "Building Materials", "Business Supplies & Equipment", "Capital Markets",
    "Chemicals", "Civic & Social Organization", "Civil Engineering", "Commercial Real Estate", "Computer & Network Security",
    "Computer Games", "Computer Hardware", "Computer Networking", "Computer Software", "Construction",
    "Consumer Electronics", "Consumer Goods", "Consumer Services", "Cosmetics", "Dairy",
    "Defense & Space", "Design", "E-Learning", "Education Management", "Electrical & Electronic Manufacturing",
    "Energy", "Entertainment", "Environmental Services", "Events Services", "Executive Office", "Facilities Services",
    "Farming", "Financial Services", "Fine Art", "Fishery", "Food & Beverages",
    "Food Production", "Fund-Raising", "Furniture", "Gambling & Casinos", "Glass, Ceramics & Concrete",
    "Government Administration", "Government Relations", "Graphic Design", "Health, Wellness & Fitness", "Healthcare",
    "Higher Education", "Hospital & Health Care", "Hospitality", "Human Resources", "Import and Export",
    "Individual & Family Services", "Industrial Automation", "Information Services", "Information Technology & Services", "Insurance",
    "International Affairs", "International Trade & Development", "Internet", "Investment Banking", "Investment Management",
    "Judiciary", "Law Enforcement", "Law Practice", "Legal Services", "Legislative Office",
    "Leisure, Travel & Tourism", "Libraries", "Logistics & Supply Chain", "Luxury Goods & Jewelry", "Machinery",
    "Management Consulting", "Maritime", "Market Research", "Marketing & Advertising", "Mechanical or Industrial Engineering",
    "Media Production", "Medical Devices", "Medical Practice", "Mental Health Care", "Military",
    "Mining & Metals", "Motion Pictures & Film", "Museums & Institutions", "Music", "Nanotechnology",
    "Newspapers", "Non-Profit Organization Management", "Oil & Energy", "Online Media", "Outsourcing/Offshoring",
    "Package/Freight Delivery", "Packaging & Containers", "Paper & Forest Products", "Performing Arts", "Pharmaceuticals",
    "Photography", "Plastics", "Political Organization", "Primary/Secondary Education", "Printing",
    "Professional Training & Coaching", "Program Development", "Public Policy", "Public Relations & Communications", "Public Safety",
    "Publishing", "Railroad Manufacture", "Ranching", "Real Estate", "Recreational Facilities & Services",
    "Religious Institutions", "Renewables & Environment", "Research", "Restaurants", "Retail",
    "Security & Investigations", "Semiconductors", "Shipbuilding", "Sporting Goods", "Sports",
    "Staffing & Recruiting", "Supermarkets", "Technology", "Telecommunications", "Textiles",
    "Tobacco", "Translation & Localization", "Transportation/Trucking/Railroad", "Utilities", "Venture Capital & Private Equity",
    "Veterinary", "Warehousing", "Wholesale", "Wine & Spirits", "Wireless",
    "Writing & Editing",
];

pub const COUNTRIES: &[&str] = &[
    "Afghanistan", "Albania", "Algeria", "Andorra", "Angola", "Antigua and Barbuda", "Argentina", "Armenia", "Australia", "Austria",
    "Azerbaijan", "Bahamas", "Bahrain", "Bangladesh", "Barbados", "Belarus", "Belgium", "Belize", "Benin", "Bhutan",
    "Bolivia", "Bosnia and Herzegovina", "Botswana", "Brazil", "Brunei", "Bulgaria", "Burkina Faso", "Burundi", "Cabo Verde", "Cambodia",
    "Cameroon", "Canada", "Central African Republic", "Chad", "Chile", "China", "Colombia", "Comoros", "Congo", "Costa Rica",
    "Croatia", "Cuba", "Cyprus", "Czech Republic", "Democratic Republic of the Congo", "Denmark", "Djibouti", "Dominica", "Dominican Republic", "Ecuador",
    "Egypt", "El Salvador", "Equatorial Guinea", "Eritrea", "Estonia", "Eswatini", "Ethiopia", "Fiji", "Finland", "France",
    "Gabon", "Gambia", "Georgia", "Germany", "Ghana", "Greece", "Grenada", "Guatemala", "Guinea", "Guinea-Bissau",
    "Guyana", "Haiti", "Honduras", "Hungary", "Iceland", "India", "Indonesia", "Iran", "Iraq", "Ireland",
    "Israel", "Italy", "Jamaica", "Japan", "Jordan", "Kazakhstan", "Kenya", "Kiribati", "Kuwait", "Kyrgyzstan",
    "Laos", "Latvia", "Lebanon", "Lesotho", "Liberia", "Libya", "Liechtenstein", "Lithuania", "Luxembourg", "Madagascar",
    "Malawi", "Malaysia", "Maldives", "Mali", "Malta", "Marshall Islands", "Mauritania", "Mauritius", "Mexico", "Micronesia",
    "Moldova", "Monaco", "Mongolia", "Montenegro", "Morocco", "Mozambique", "Myanmar", "Namibia", "Nauru", "Nepal",
    "Netherlands", "New Zealand", "Nicaragua", "Niger", "Nigeria", "North Korea", "North Macedonia", "Norway", "Oman", "Pakistan",
    "Palau", "Palestine", "Panama", "Papua New Guinea", "Paraguay", "Peru", "Philippines", "Poland", "Portugal", "Qatar",
    "Romania", "Russia", "Rwanda", "Saint Kitts and Nevis", "Saint Lucia", "Saint Vincent and the Grenadines", "Samoa", "San Marino", "Sao Tome and Principe", "Saudi Arabia",
    "Senegal", "Serbia", "Seychelles", "Sierra Leone", "Singapore", "Slovakia", "Slovenia", "Solomon Islands", "Somalia", "South Africa",
    "South Korea", "South Sudan", "Spain", "Sri Lanka", "Sudan", "Suriname", "Sweden", "Switzerland", "Syria", "Taiwan",
    "Tajikistan", "Tanzania", "Thailand", "Timor-Leste", "Togo", "Tonga", "Trinidad and Tobago", "Tunisia", "Turkey", "Turkmenistan",
    "Tuvalu", "Uganda", "Ukraine", "United Arab Emirates", "United Kingdom", "United States", "Uruguay", "Uzbekistan", "Vanuatu", "Vatican City",
    "Venezuela", "Vietnam", "Yemen", "Zambia", "Zimbabwe",
];

fn lookup(table: &[(&str, f64)], key: &str, default: f64) -> f64 {
    table
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, value)| *value)
        .unwrap_or(default)
}

/// The tables shipped with the website.
#[derive(Debug, Default, Clone, Copy)]
pub struct StaticReferenceData;

impl ReferenceData for StaticReferenceData {
    fn comparables(&self, industry: &str, country: &str) -> Option<Vec<ComparableCompany>> {
        COMPARABLES
            .iter()
            .find(|(i, c, _)| *i == industry && *c == country)
            .map(|(_, _, rows)| {
                rows.iter()
                    .map(|(name, pe, ev_ebit, ev_ebitda)| {
                        ComparableCompany::new(*name, *pe, *ev_ebit, *ev_ebitda)
                    })
                    .collect()
            })
    }

    fn industry_rd_factor(&self, industry: &str) -> f64 {
        lookup(INDUSTRY_RD_FACTORS, industry, DEFAULT_RD_FACTOR)
    }

    fn country_rd_factor(&self, country: &str) -> f64 {
        lookup(COUNTRY_RD_FACTORS, country, DEFAULT_RD_FACTOR)
    }

    fn industry_royalty_rate(&self, industry: &str) -> f64 {
        lookup(INDUSTRY_ROYALTY_RATES, industry, DEFAULT_INDUSTRY_ROYALTY_RATE)
    }

    fn country_royalty_rate(&self, country: &str) -> f64 {
        lookup(COUNTRY_ROYALTY_RATES, country, DEFAULT_COUNTRY_ROYALTY_RATE)
    }

    fn industries(&self) -> &[&'static str] {
        INDUSTRIES
    }

    fn countries(&self) -> &[&'static str] {
        COUNTRIES
    }
}
