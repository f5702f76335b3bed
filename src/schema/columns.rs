//! Column names used by the analyses
//!
//! Names match the headers of the crash data exports. Columns shared by
//! several tables are listed once under [`CRASH_ID`] and [`DEATH_CNT`].

/// Crash identifier, the join key across every table
pub const CRASH_ID: &str = "CRASH_ID";

/// Death count, present in both units and persons
pub const DEATH_CNT: &str = "DEATH_CNT";

/// Unit (vehicle) table columns
pub mod units {
    pub const VEH_BODY_STYL_ID: &str = "VEH_BODY_STYL_ID";
    pub const VEH_MAKE_ID: &str = "VEH_MAKE_ID";
    pub const VEH_COLOR_ID: &str = "VEH_COLOR_ID";
    pub const VEH_LIC_STATE_ID: &str = "VEH_LIC_STATE_ID";
    pub const TOT_INJRY_CNT: &str = "TOT_INJRY_CNT";
    pub const VEH_DMAG_SCL_1_ID: &str = "VEH_DMAG_SCL_1_ID";
    pub const VEH_DMAG_SCL_2_ID: &str = "VEH_DMAG_SCL_2_ID";
    pub const CONTRIB_FACTR_1_ID: &str = "CONTRIB_FACTR_1_ID";
    pub const CONTRIB_FACTR_2_ID: &str = "CONTRIB_FACTR_2_ID";
    pub const FIN_RESP_TYPE_ID: &str = "FIN_RESP_TYPE_ID";
    /// Derived: injury count plus death count
    pub const TOT_CASUALTIES_CNT: &str = "TOT_CASUALTIES_CNT";
}

/// Primary person table columns
pub mod persons {
    pub const PRSN_GNDR_ID: &str = "PRSN_GNDR_ID";
    pub const PRSN_ETHNICITY_ID: &str = "PRSN_ETHNICITY_ID";
    pub const DRVR_LIC_STATE_ID: &str = "DRVR_LIC_STATE_ID";
    pub const DRVR_LIC_TYPE_ID: &str = "DRVR_LIC_TYPE_ID";
    pub const DRVR_ZIP: &str = "DRVR_ZIP";
}

/// Charges table columns
pub mod charges {
    pub const CHARGE: &str = "CHARGE";
}

/// Damages table columns
pub mod damages {
    pub const DAMAGED_PROPERTY: &str = "DAMAGED_PROPERTY";
}
