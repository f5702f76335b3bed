//! The eight crash analyses
//!
//! Each analysis is a pure function of the tables it reads. The functions
//! take the individual record batches they need so they can be exercised
//! on small hand-built tables; [`Analysis::run`] wires them to a loaded
//! [`CrashTables`].

use std::fmt;
use std::sync::Arc;

use anyhow::Context;
use arrow::array::ArrayRef;
use arrow::compute::kernels::numeric::add;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use itertools::Itertools;

use crate::algorithm::aggregate::{
    group_counts, group_sums, sort_desc_stable, top_n, value_counts,
};
use crate::algorithm::answer::Answer;
use crate::algorithm::join::{distinct_count, drop_duplicates, inner_join};
use crate::error::Result;
use crate::filter::{Expr, filter_by};
use crate::loader::CrashTables;
use crate::schema::columns::{CRASH_ID, DEATH_CNT, charges, damages, persons, units};
use crate::utils::arrow::{get_column, int64_column, string_column};

/// Body styles that carry no information about the vehicle
pub const UNINFORMATIVE_BODY_STYLES: [&str; 4] = [
    "NA",
    "UNKNOWN",
    "NOT REPORTED",
    "OTHER  (EXPLAIN IN NARRATIVE)",
];

/// Ethnicities that carry no information about the person
pub const UNINFORMATIVE_ETHNICITIES: [&str; 2] = ["NA", "UNKNOWN"];

/// Damage scale values that are not a damage level
pub const NON_LEVEL_DAMAGE_SCALES: [&str; 3] = ["NA", "NO DAMAGE", "INVALID VALUE"];

/// Damage scale threshold, compared lexically
pub const DAMAGE_LEVEL_THRESHOLD: &str = "DAMAGED 4";

/// Licence types held by licensed drivers
pub const LICENSED_DRIVER_TYPES: [&str; 2] = ["DRIVER LICENSE", "COMMERCIAL DRIVER LIC."];

/// Makes ranked by casualties that are kept before slicing
pub const CASUALTY_RANKING_DEPTH: usize = 20;
/// Zero-based slice of the casualty ranking that is reported
pub const CASUALTY_RANK_SLICE: std::ops::Range<usize> = 4..14;

/// Rows in the persons table for a male driver or occupant who died
pub fn count_male_fatalities(persons_table: &RecordBatch) -> Result<usize> {
    let expr = Expr::And(vec![
        Expr::eq(persons::PRSN_GNDR_ID, "MALE"),
        Expr::eq(DEATH_CNT, 1_i64),
    ]);
    Ok(filter_by(persons_table, expr)?.num_rows())
}

/// Distinct unit rows whose body style mentions a motorcycle
pub fn count_two_wheeler_crashes(units_table: &RecordBatch) -> Result<usize> {
    let motorcycles = filter_by(
        units_table,
        Expr::contains(units::VEH_BODY_STYL_ID, "MOTORCYCLE"),
    )?;
    Ok(drop_duplicates(&motorcycles)?.num_rows())
}

/// Driver licence state with the most rows for female persons
pub fn state_with_most_female_involvement(persons_table: &RecordBatch) -> Result<Option<String>> {
    let females = filter_by(persons_table, Expr::eq(persons::PRSN_GNDR_ID, "FEMALE"))?;
    let states = string_column(&females, persons::DRVR_LIC_STATE_ID)?;

    let mut counts = group_counts(&[&states]);
    sort_desc_stable(&mut counts);

    Ok(counts.into_iter().next().and_then(|(key, _)| key.into_iter().next()))
}

/// Append the per-unit casualty count (injuries plus deaths) to a copy of `units_table`
pub fn with_casualty_column(units_table: &RecordBatch) -> Result<RecordBatch> {
    let injuries = get_column(units_table, units::TOT_INJRY_CNT, &DataType::Int64)?;
    let deaths = get_column(units_table, DEATH_CNT, &DataType::Int64)?;
    let casualties: ArrayRef = add(&injuries, &deaths).context("Failed to add casualty counts")?;

    let mut fields = units_table.schema().fields().iter().cloned().collect_vec();
    fields.push(Arc::new(Field::new(
        units::TOT_CASUALTIES_CNT,
        DataType::Int64,
        true,
    )));
    let mut columns = units_table.columns().to_vec();
    columns.push(casualties);

    RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)
        .context("Failed to append casualty column")
}

/// Vehicle makes ranked 5th through 14th by total casualties
///
/// The ranking is cut to the top 20 first and then sliced `[4, 14)`, so
/// fewer than 20 makes yields fewer than 10 entries.
pub fn top_vehicle_makes_by_casualties(units_table: &RecordBatch) -> Result<Vec<String>> {
    let with_casualties = with_casualty_column(units_table)?;
    let makes = string_column(&with_casualties, units::VEH_MAKE_ID)?;
    let casualties = int64_column(&with_casualties, units::TOT_CASUALTIES_CNT)?;

    let mut sums = group_sums(&makes, &casualties);
    sort_desc_stable(&mut sums);
    sums.truncate(CASUALTY_RANKING_DEPTH);

    Ok(sums
        .into_iter()
        .skip(CASUALTY_RANK_SLICE.start)
        .take(CASUALTY_RANK_SLICE.len())
        .map(|(make, _)| make)
        .collect())
}

/// Most frequent ethnicity for each informative body style
///
/// Within a body style, ties go to the ethnicity that sorts first. The
/// result is ordered by the winning count, descending.
pub fn top_ethnicity_per_body_style(
    units_table: &RecordBatch,
    persons_table: &RecordBatch,
) -> Result<Vec<(String, String)>> {
    let joined = inner_join(units_table, persons_table, CRASH_ID)?;
    let informative = filter_by(
        &joined,
        Expr::And(vec![
            Expr::not_in(units::VEH_BODY_STYL_ID, UNINFORMATIVE_BODY_STYLES),
            Expr::not_in(persons::PRSN_ETHNICITY_ID, UNINFORMATIVE_ETHNICITIES),
        ]),
    )?;
    let distinct = drop_duplicates(&informative)?;

    let styles = string_column(&distinct, units::VEH_BODY_STYL_ID)?;
    let ethnicities = string_column(&distinct, persons::PRSN_ETHNICITY_ID)?;

    let mut counts = group_counts(&[&styles, &ethnicities]);
    sort_desc_stable(&mut counts);

    Ok(counts
        .into_iter()
        .unique_by(|(key, _)| key[0].clone())
        .map(|(key, _)| {
            let mut parts = key.into_iter();
            let style = parts.next().unwrap_or_default();
            let ethnicity = parts.next().unwrap_or_default();
            (style, ethnicity)
        })
        .collect())
}

/// Top five driver zip codes among crashes with alcohol as a contributing factor
pub fn top_zip_codes_with_alcohol_factor(
    units_table: &RecordBatch,
    persons_table: &RecordBatch,
) -> Result<Vec<String>> {
    let joined = inner_join(units_table, persons_table, CRASH_ID)?;
    let alcohol = filter_by(
        &joined,
        Expr::And(vec![
            Expr::not_null(persons::DRVR_ZIP),
            Expr::Or(vec![
                Expr::contains(units::CONTRIB_FACTR_1_ID, "ALCOHOL"),
                Expr::contains(units::CONTRIB_FACTR_2_ID, "ALCOHOL"),
            ]),
        ]),
    )?;

    let zips = string_column(&alcohol, persons::DRVR_ZIP)?;
    Ok(top_n(&value_counts(&zips), 5))
}

/// Damage above level 4 on one damage scale column
fn damage_above_level_four(column: &str) -> Expr {
    Expr::And(vec![
        Expr::gt(column, DAMAGE_LEVEL_THRESHOLD),
        Expr::not_in(column, NON_LEVEL_DAMAGE_SCALES),
    ])
}

/// Distinct insured crashes with heavy vehicle damage but no damaged property
///
/// Damage levels compare as strings, so `"DAMAGED 10"` does not count as
/// above `"DAMAGED 4"`.
pub fn crashes_with_insurance_but_no_property_damage(
    damages_table: &RecordBatch,
    units_table: &RecordBatch,
) -> Result<usize> {
    let joined = inner_join(damages_table, units_table, CRASH_ID)?;
    let qualifying = filter_by(
        &joined,
        Expr::And(vec![
            Expr::Or(vec![
                damage_above_level_four(units::VEH_DMAG_SCL_1_ID),
                damage_above_level_four(units::VEH_DMAG_SCL_2_ID),
            ]),
            Expr::eq(damages::DAMAGED_PROPERTY, "NONE"),
            Expr::eq(units::FIN_RESP_TYPE_ID, "PROOF OF LIABILITY INSURANCE"),
        ]),
    )?;
    distinct_count(&qualifying, CRASH_ID)
}

/// Top five vehicle makes for licensed drivers charged with speeding, among
/// the ten most common colours and the 25 most common licence states
pub fn top_vehicle_makes_by_offense_profile(
    charges_table: &RecordBatch,
    persons_table: &RecordBatch,
    units_table: &RecordBatch,
) -> Result<Vec<String>> {
    let top_states = top_n(
        &value_counts(&string_column(units_table, units::VEH_LIC_STATE_ID)?),
        25,
    );
    let top_colors = top_n(
        &value_counts(&string_column(units_table, units::VEH_COLOR_ID)?),
        10,
    );

    let charged_persons = inner_join(charges_table, persons_table, CRASH_ID)?;
    let joined = inner_join(&charged_persons, units_table, CRASH_ID)?;

    let offenders = filter_by(
        &joined,
        Expr::And(vec![
            Expr::contains(charges::CHARGE, "SPEED"),
            Expr::is_in(persons::DRVR_LIC_TYPE_ID, LICENSED_DRIVER_TYPES),
            Expr::is_in(units::VEH_COLOR_ID, top_colors),
            Expr::is_in(units::VEH_LIC_STATE_ID, top_states),
        ]),
    )?;

    let makes = string_column(&offenders, units::VEH_MAKE_ID)?;
    Ok(top_n(&value_counts(&makes), 5))
}

/// The analyses run by the driver, in output order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Analysis {
    MaleFatalities,
    TwoWheelerCrashes,
    FemaleInvolvementState,
    CasualtyRankedMakes,
    TopEthnicityPerBodyStyle,
    AlcoholZipCodes,
    InsuredWithoutPropertyDamage,
    SpeedingOffenseMakes,
}

impl Analysis {
    /// Every analysis, in the order they are run and numbered
    pub const ALL: [Self; 8] = [
        Self::MaleFatalities,
        Self::TwoWheelerCrashes,
        Self::FemaleInvolvementState,
        Self::CasualtyRankedMakes,
        Self::TopEthnicityPerBodyStyle,
        Self::AlcoholZipCodes,
        Self::InsuredWithoutPropertyDamage,
        Self::SpeedingOffenseMakes,
    ];

    /// One-based question number
    #[must_use]
    pub fn number(self) -> usize {
        Self::ALL.iter().position(|a| *a == self).map_or(0, |i| i + 1)
    }

    /// Key of the destination in the `Output` config section
    #[must_use]
    pub fn output_key(self) -> String {
        format!("analytics{}", self.number())
    }

    /// Short description for logs
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::MaleFatalities => "male persons killed",
            Self::TwoWheelerCrashes => "crashes involving two-wheelers",
            Self::FemaleInvolvementState => "state with most female involvement",
            Self::CasualtyRankedMakes => "makes ranked 5th-14th by casualties",
            Self::TopEthnicityPerBodyStyle => "top ethnicity per body style",
            Self::AlcoholZipCodes => "top zip codes with alcohol factor",
            Self::InsuredWithoutPropertyDamage => "insured crashes without property damage",
            Self::SpeedingOffenseMakes => "top makes for speeding offenses",
        }
    }

    /// Run the analysis against the loaded tables
    pub fn run(self, tables: &CrashTables) -> Result<Answer> {
        let answer = match self {
            Self::MaleFatalities => Answer::Count {
                label: "male_fatalities",
                value: count_male_fatalities(&tables.persons)?,
            },
            Self::TwoWheelerCrashes => Answer::Count {
                label: "two_wheeler_crashes",
                value: count_two_wheeler_crashes(&tables.units)?,
            },
            Self::FemaleInvolvementState => Answer::Label {
                label: "state_with_most_female_involvement",
                value: state_with_most_female_involvement(&tables.persons)?,
            },
            Self::CasualtyRankedMakes => Answer::Column {
                name: units::VEH_MAKE_ID,
                values: top_vehicle_makes_by_casualties(&tables.units)?,
            },
            Self::TopEthnicityPerBodyStyle => Answer::Pairs {
                columns: [units::VEH_BODY_STYL_ID, persons::PRSN_ETHNICITY_ID],
                rows: top_ethnicity_per_body_style(&tables.units, &tables.persons)?,
            },
            Self::AlcoholZipCodes => Answer::Column {
                name: persons::DRVR_ZIP,
                values: top_zip_codes_with_alcohol_factor(&tables.units, &tables.persons)?,
            },
            Self::InsuredWithoutPropertyDamage => Answer::Count {
                label: "insured_crashes_without_property_damage",
                value: crashes_with_insurance_but_no_property_damage(
                    &tables.damages,
                    &tables.units,
                )?,
            },
            Self::SpeedingOffenseMakes => Answer::Column {
                name: units::VEH_MAKE_ID,
                values: top_vehicle_makes_by_offense_profile(
                    &tables.charges,
                    &tables.persons,
                    &tables.units,
                )?,
            },
        };
        Ok(answer)
    }
}

impl fmt::Display for Analysis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Question-{} ({})", self.number(), self.description())
    }
}
