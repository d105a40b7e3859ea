use std::str::FromStr;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Networks {
    /// Low work parameters, publicly known genesis key, dev IP ports
    #[default]
    NanoDevNetwork,
    /// Normal work parameters, secret live key, live IP ports
    NanoLiveNetwork,
}

impl Networks {
    pub fn as_str(&self) -> &'static str {
        match self {
            Networks::NanoDevNetwork => "dev",
            Networks::NanoLiveNetwork => "live",
        }
    }
}

impl FromStr for Networks {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dev" => Ok(Networks::NanoDevNetwork),
            "live" => Ok(Networks::NanoLiveNetwork),
            _ => Err(anyhow!("invalid network: {}", s)),
        }
    }
}
