use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::InvoiceError;

/// Indian states and union territories a party can be registered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IndianState {
    #[serde(rename = "Andhra Pradesh")]
    AndhraPradesh,
    #[serde(rename = "Arunachal Pradesh")]
    ArunachalPradesh,
    #[serde(rename = "Assam")]
    Assam,
    #[serde(rename = "Bihar")]
    Bihar,
    #[serde(rename = "Chhattisgarh")]
    Chhattisgarh,
    #[serde(rename = "Goa")]
    Goa,
    #[serde(rename = "Gujarat")]
    Gujarat,
    #[serde(rename = "Haryana")]
    Haryana,
    #[serde(rename = "Himachal Pradesh")]
    HimachalPradesh,
    #[serde(rename = "Jharkhand")]
    Jharkhand,
    #[serde(rename = "Karnataka")]
    Karnataka,
    #[serde(rename = "Kerala")]
    Kerala,
    #[serde(rename = "Madhya Pradesh")]
    MadhyaPradesh,
    #[serde(rename = "Maharashtra")]
    Maharashtra,
    #[serde(rename = "Manipur")]
    Manipur,
    #[serde(rename = "Meghalaya")]
    Meghalaya,
    #[serde(rename = "Mizoram")]
    Mizoram,
    #[serde(rename = "Nagaland")]
    Nagaland,
    #[serde(rename = "Odisha")]
    Odisha,
    #[serde(rename = "Punjab")]
    Punjab,
    #[serde(rename = "Rajasthan")]
    Rajasthan,
    #[serde(rename = "Sikkim")]
    Sikkim,
    #[serde(rename = "Tamil Nadu")]
    TamilNadu,
    #[serde(rename = "Telangana")]
    Telangana,
    #[serde(rename = "Tripura")]
    Tripura,
    #[serde(rename = "Uttar Pradesh")]
    UttarPradesh,
    #[serde(rename = "Uttarakhand")]
    Uttarakhand,
    #[serde(rename = "West Bengal")]
    WestBengal,
    #[serde(rename = "Andaman and Nicobar Islands")]
    AndamanAndNicobarIslands,
    #[serde(rename = "Chandigarh")]
    Chandigarh,
    #[serde(rename = "Dadra and Nagar Haveli and Daman and Diu")]
    DadraAndNagarHaveliAndDamanAndDiu,
    #[serde(rename = "Delhi")]
    Delhi,
    #[serde(rename = "Jammu and Kashmir")]
    JammuAndKashmir,
    #[serde(rename = "Ladakh")]
    Ladakh,
    #[serde(rename = "Lakshadweep")]
    Lakshadweep,
    #[serde(rename = "Puducherry")]
    Puducherry,
}

impl IndianState {
    pub const ALL: [IndianState; 36] = [
        IndianState::AndhraPradesh,
        IndianState::ArunachalPradesh,
        IndianState::Assam,
        IndianState::Bihar,
        IndianState::Chhattisgarh,
        IndianState::Goa,
        IndianState::Gujarat,
        IndianState::Haryana,
        IndianState::HimachalPradesh,
        IndianState::Jharkhand,
        IndianState::Karnataka,
        IndianState::Kerala,
        IndianState::MadhyaPradesh,
        IndianState::Maharashtra,
        IndianState::Manipur,
        IndianState::Meghalaya,
        IndianState::Mizoram,
        IndianState::Nagaland,
        IndianState::Odisha,
        IndianState::Punjab,
        IndianState::Rajasthan,
        IndianState::Sikkim,
        IndianState::TamilNadu,
        IndianState::Telangana,
        IndianState::Tripura,
        IndianState::UttarPradesh,
        IndianState::Uttarakhand,
        IndianState::WestBengal,
        IndianState::AndamanAndNicobarIslands,
        IndianState::Chandigarh,
        IndianState::DadraAndNagarHaveliAndDamanAndDiu,
        IndianState::Delhi,
        IndianState::JammuAndKashmir,
        IndianState::Ladakh,
        IndianState::Lakshadweep,
        IndianState::Puducherry,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IndianState::AndhraPradesh => "Andhra Pradesh",
            IndianState::ArunachalPradesh => "Arunachal Pradesh",
            IndianState::Assam => "Assam",
            IndianState::Bihar => "Bihar",
            IndianState::Chhattisgarh => "Chhattisgarh",
            IndianState::Goa => "Goa",
            IndianState::Gujarat => "Gujarat",
            IndianState::Haryana => "Haryana",
            IndianState::HimachalPradesh => "Himachal Pradesh",
            IndianState::Jharkhand => "Jharkhand",
            IndianState::Karnataka => "Karnataka",
            IndianState::Kerala => "Kerala",
            IndianState::MadhyaPradesh => "Madhya Pradesh",
            IndianState::Maharashtra => "Maharashtra",
            IndianState::Manipur => "Manipur",
            IndianState::Meghalaya => "Meghalaya",
            IndianState::Mizoram => "Mizoram",
            IndianState::Nagaland => "Nagaland",
            IndianState::Odisha => "Odisha",
            IndianState::Punjab => "Punjab",
            IndianState::Rajasthan => "Rajasthan",
            IndianState::Sikkim => "Sikkim",
            IndianState::TamilNadu => "Tamil Nadu",
            IndianState::Telangana => "Telangana",
            IndianState::Tripura => "Tripura",
            IndianState::UttarPradesh => "Uttar Pradesh",
            IndianState::Uttarakhand => "Uttarakhand",
            IndianState::WestBengal => "West Bengal",
            IndianState::AndamanAndNicobarIslands => "Andaman and Nicobar Islands",
            IndianState::Chandigarh => "Chandigarh",
            IndianState::DadraAndNagarHaveliAndDamanAndDiu => "Dadra and Nagar Haveli and Daman and Diu",
            IndianState::Delhi => "Delhi",
            IndianState::JammuAndKashmir => "Jammu and Kashmir",
            IndianState::Ladakh => "Ladakh",
            IndianState::Lakshadweep => "Lakshadweep",
            IndianState::Puducherry => "Puducherry",
        }
    }
}

impl fmt::Display for IndianState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IndianState {
    type Err = InvoiceError;

    /// Matches the display name, ignoring ASCII case and surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        IndianState::ALL
            .iter()
            .copied()
            .find(|st| st.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| InvoiceError::InvalidValue {
                field: "state".to_string(),
                value: s.to_string(),
            })
    }
}
