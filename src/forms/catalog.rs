// src/forms/catalog.rs
//
// Report forms

use super::schema::{DetailSchema, FieldDefault, FormField, FormSchema, ReferenceTable};

const ZERO: FieldDefault = FieldDefault::Integer(0);
const ZERO_REAL: FieldDefault = FieldDefault::Real(0.0);

// ---------------------------------------------------------------------
// Reference lists
// ---------------------------------------------------------------------

pub const CROP_REFERENCE: ReferenceTable = ReferenceTable {
    table: "crops",
    id_column: "crop_id",
    name_column: "crop_name",
    name_field: "cropName",
    name_aliases: &["crop", "crop_name", "nameOfCrop"],
    name_labels: &["Crop"],
};

pub const SEASON_REFERENCE: ReferenceTable = ReferenceTable {
    table: "seasons",
    id_column: "season_id",
    name_column: "season_name",
    name_field: "seasonName",
    name_aliases: &["season", "season_name"],
    name_labels: &["Season"],
};

pub const IMPORTANT_DAY_REFERENCE: ReferenceTable = ReferenceTable {
    table: "important_days",
    id_column: "important_day_id",
    name_column: "day_name",
    name_field: "importantDayName",
    name_aliases: &["importantDay", "important_day", "dayName", "day_name"],
    name_labels: &["Important Day"],
};

// ---------------------------------------------------------------------
// Forms
// ---------------------------------------------------------------------

pub static TRAINING: FormSchema = FormSchema {
    name: "training",
    title: "Training Programmes",
    table: "training_programmes",
    id_column: "training_id",
    id_field: "trainingId",
    fields: &[
        FormField::date("startDate", "start_date")
            .aliases(&["start_date", "fromDate"])
            .labels(&["Start Date"]),
        FormField::date("endDate", "end_date")
            .aliases(&["end_date", "toDate"])
            .labels(&["End Date"]),
        FormField::text("title", "title")
            .aliases(&["trainingTitle", "training_title", "courseTitle"])
            .labels(&["Title of Training"])
            .required(),
        FormField::text("venue", "venue")
            .aliases(&["place"])
            .labels(&["Venue"]),
        FormField::text("campusType", "campus_type")
            .aliases(&["campus", "campus_type"])
            .labels(&["On/Off Campus"])
            .default(FieldDefault::Text("On Campus")),
        FormField::integer("generalM", "general_m")
            .aliases(&["gen_m", "farmersGeneralM", "general_male"])
            .labels(&["General (M)"])
            .default(ZERO),
        FormField::integer("generalF", "general_f")
            .aliases(&["gen_f", "farmersGeneralF", "general_female"])
            .labels(&["General (F)"])
            .default(ZERO),
        FormField::integer("obcM", "obc_m")
            .aliases(&["obc_m", "farmersObcM"])
            .labels(&["OBC (M)"])
            .default(ZERO),
        FormField::integer("obcF", "obc_f")
            .aliases(&["obc_f", "farmersObcF"])
            .labels(&["OBC (F)"])
            .default(ZERO),
        FormField::integer("scM", "sc_m")
            .aliases(&["sc_m", "farmersScM"])
            .labels(&["SC (M)"])
            .default(ZERO),
        FormField::integer("scF", "sc_f")
            .aliases(&["sc_f", "farmersScF"])
            .labels(&["SC (F)"])
            .default(ZERO),
        FormField::integer("stM", "st_m")
            .aliases(&["st_m", "farmersStM"])
            .labels(&["ST (M)"])
            .default(ZERO),
        FormField::integer("stF", "st_f")
            .aliases(&["st_f", "farmersStF"])
            .labels(&["ST (F)"])
            .default(ZERO),
    ],
    details: None,
};

pub static OFT: FormSchema = FormSchema {
    name: "oft",
    title: "On-Farm Trials",
    table: "oft_trials",
    id_column: "oft_id",
    id_field: "oftId",
    fields: &[
        FormField::text("title", "title")
            .aliases(&["oftTitle", "trialTitle", "title_of_oft"])
            .labels(&["Title of OFT"])
            .required(),
        FormField::reference("cropId", "crop_id", &CROP_REFERENCE).aliases(&["crop_id"]),
        // The header typo is what the report tables render.
        FormField::text("problemDiagnosed", "problem_diagnosed")
            .aliases(&["problem_diagnosed", "problemDiagnoised", "diagnosedProblem"])
            .labels(&["Problem Diagnoised"]),
        FormField::text("technologyAssessed", "technology_assessed")
            .aliases(&["technology", "technology_assessed"])
            .labels(&["Technology Assessed"]),
        FormField::integer("numberOfTrials", "no_of_trials")
            .aliases(&["trials", "noOfTrials", "no_of_trials"])
            .labels(&["No. of Trials"])
            .default(ZERO),
        FormField::real("areaHa", "area_ha")
            .aliases(&["area", "area_ha"])
            .labels(&["Area (ha)"])
            .default(ZERO_REAL),
        FormField::text("status", "status")
            .aliases(&["oftStatus"])
            .labels(&["Status"])
            .default(FieldDefault::Text("Ongoing")),
        FormField::date("startDate", "start_date")
            .aliases(&["start_date"])
            .labels(&["Start Date"]),
    ],
    details: None,
};

pub static FLD: FormSchema = FormSchema {
    name: "fld",
    title: "Frontline Demonstrations",
    table: "fld_demonstrations",
    id_column: "fld_id",
    id_field: "fldId",
    fields: &[
        FormField::reference("seasonId", "season_id", &SEASON_REFERENCE).aliases(&["season_id"]),
        FormField::reference("cropId", "crop_id", &CROP_REFERENCE).aliases(&["crop_id"]),
        FormField::text("variety", "variety")
            .aliases(&["varietyName", "variety_name"])
            .labels(&["Variety"]),
        FormField::text("technologyDemonstrated", "technology_demonstrated")
            .aliases(&["technology", "technology_demonstrated"])
            .labels(&["Technology Demonstrated"]),
        FormField::real("areaHa", "area_ha")
            .aliases(&["area", "area_ha"])
            .labels(&["Area (ha)"])
            .default(ZERO_REAL),
        FormField::integer("numberOfDemos", "no_of_demos")
            .aliases(&["demos", "noOfDemos", "no_of_demos"])
            .labels(&["No. of Demonstrations"])
            .default(ZERO),
        FormField::real("demoYield", "demo_yield")
            .aliases(&["yieldDemo", "demonstrationYield", "demo_yield"])
            .labels(&["Demo Yield (q/ha)"]),
        FormField::real("checkYield", "check_yield")
            .aliases(&["yieldCheck", "localCheckYield", "check_yield"])
            .labels(&["Check Yield (q/ha)"]),
    ],
    details: None,
};

pub static AWARDS: FormSchema = FormSchema {
    name: "awards",
    title: "KVK Awards",
    table: "kvk_awards",
    id_column: "award_id",
    id_field: "awardId",
    fields: &[
        FormField::text("awardName", "award_name")
            .aliases(&["award", "award_name", "nameOfAward"])
            .labels(&["Name of the Award"])
            .required(),
        FormField::real("amount", "amount")
            .aliases(&["awardAmount", "cashPrize"])
            .labels(&["Amount (Rs.)"])
            .default(ZERO_REAL),
        FormField::text("achievement", "achievement")
            .aliases(&["achievements"])
            .labels(&["Achievement"]),
        FormField::text("conferringAuthority", "conferring_authority")
            .aliases(&["conferredBy", "conferring_authority"])
            .labels(&["Conferring Authority"]),
        FormField::integer("awardYear", "award_year")
            .aliases(&["year", "award_year"])
            .labels(&["Year"]),
    ],
    details: None,
};

pub static SOIL_TESTING: FormSchema = FormSchema {
    name: "soil-testing",
    title: "Soil Testing",
    table: "soil_testing",
    id_column: "soil_testing_id",
    id_field: "soilTestingId",
    fields: &[
        FormField::date("analysisDate", "analysis_date")
            .aliases(&["date", "analysis_date"])
            .labels(&["Date"]),
        FormField::integer("samplesAnalysed", "samples_analysed")
            .aliases(&["noOfSamples", "samples", "samplesAnalyzed"])
            .labels(&["No. of Samples Analysed"])
            .default(ZERO),
        FormField::integer("soilHealthCards", "soil_health_cards")
            .aliases(&["shcIssued", "soil_health_cards"])
            .labels(&["Soil Health Cards Issued"])
            .default(ZERO),
        FormField::integer("farmersBenefited", "farmers_benefited")
            .aliases(&["noOfFarmers", "farmers"])
            .labels(&["No. of Farmers Benefited"])
            .default(ZERO),
        FormField::integer("villagesCovered", "villages_covered")
            .aliases(&["noOfVillages", "villages"])
            .labels(&["No. of Villages"])
            .default(ZERO),
        FormField::real("amountRealized", "amount_realized")
            .aliases(&["amountRealised", "revenue"])
            .labels(&["Amount Realized (Rs.)"])
            .default(ZERO_REAL),
    ],
    details: None,
};

pub static CELEBRATIONS: FormSchema = FormSchema {
    name: "celebrations",
    title: "Celebration of Important Days",
    table: "day_celebrations",
    id_column: "celebration_id",
    id_field: "celebrationId",
    fields: &[
        FormField::reference("importantDayId", "important_day_id", &IMPORTANT_DAY_REFERENCE)
            .aliases(&["important_day_id", "dayId"])
            .required(),
        FormField::date("eventDate", "event_date")
            .aliases(&["date", "celebrationDate"])
            .labels(&["Date of Celebration"]),
        FormField::integer("participants", "participants")
            .aliases(&["noOfParticipants", "participantCount"])
            .labels(&["No. of Participants"])
            .default(ZERO),
        FormField::text("activities", "activities")
            .aliases(&["activitiesConducted", "activity"])
            .labels(&["Activities Conducted"]),
    ],
    details: None,
};

pub static CSISA_CROP_DETAILS: DetailSchema = DetailSchema {
    key: "cropDetails",
    aliases: &["crops", "crop_details"],
    table: "csisa_crop_details",
    id_column: "detail_id",
    id_field: "detailId",
    parent_column: "csisa_id",
    fields: &[
        FormField::reference("cropId", "crop_id", &CROP_REFERENCE).aliases(&["crop_id"]),
        FormField::text("variety", "variety")
            .aliases(&["varietyName"])
            .labels(&["Variety"]),
        FormField::real("areaHa", "area_ha")
            .aliases(&["area", "area_ha"])
            .labels(&["Area (ha)"])
            .default(ZERO_REAL),
        FormField::real("yieldQha", "yield_qha")
            .aliases(&["yield", "grainYield", "yield_qha"])
            .labels(&["Yield (q/ha)"]),
    ],
};

pub static CSISA: FormSchema = FormSchema {
    name: "csisa",
    title: "CSISA",
    table: "csisa_records",
    id_column: "csisa_id",
    id_field: "csisaId",
    fields: &[
        FormField::integer("reportingYear", "reporting_year")
            .aliases(&["year", "reporting_year"])
            .labels(&["Year"])
            .required(),
        FormField::integer("villagesCovered", "villages_covered")
            .aliases(&["noOfVillages", "villages"])
            .labels(&["No. of Villages Covered"])
            .default(ZERO),
        FormField::integer("farmersCovered", "farmers_covered")
            .aliases(&["noOfFarmers", "farmers"])
            .labels(&["No. of Farmers Covered"])
            .default(ZERO),
        FormField::text("remarks", "remarks")
            .aliases(&["remark"])
            .labels(&["Remarks"]),
    ],
    details: Some(&CSISA_CROP_DETAILS),
};
