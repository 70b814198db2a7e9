// src/repositories/form_repository_tests.rs
//
// Form repository tests
//
// INVARIANTS TESTED:
// - reads join the KVK name and reference names
// - a free-text reference name creates exactly one reference row
// - a KVK filter makes foreign rows indistinguishable from absent ones
// - header and detail rows are written all-or-nothing

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use crate::domain::Record;
    use crate::error::AppError;
    use crate::forms::catalog::{CELEBRATIONS, CSISA, OFT, TRAINING};
    use crate::forms::{normalize, FormSchema, NormalizedInput, WriteMode};
    use crate::repositories::test_support::{seed_kvk, test_pool};
    use crate::repositories::{FormChanges, FormRepository, ListOptions, SqliteFormRepository};

    fn input(schema: &FormSchema, body: Value, mode: WriteMode) -> NormalizedInput {
        normalize(schema, body.as_object().unwrap(), mode).unwrap()
    }

    fn create(
        repo: &SqliteFormRepository,
        schema: &FormSchema,
        kvk_id: i64,
        body: Value,
    ) -> Record {
        let normalized = input(schema, body, WriteMode::Create);
        repo.create(schema, kvk_id, &normalized.row, normalized.details.as_deref())
            .unwrap()
    }

    fn setup() -> SqliteFormRepository {
        let pool = test_pool();
        seed_kvk(&pool, 5, "KVK Ludhiana");
        seed_kvk(&pool, 7, "KVK Samrala");
        SqliteFormRepository::new(pool)
    }

    #[test]
    fn test_create_and_read_back() {
        let repo = setup();
        let created = create(
            &repo,
            &TRAINING,
            5,
            json!({
                "trainingTitle": "Seed treatment",
                "gen_m": "12",
                "startDate": "2024-03-05T00:00:00Z",
            }),
        );

        let id = created["trainingId"].as_i64().unwrap();
        let read = repo.find_by_id(&TRAINING, id, None).unwrap().unwrap();

        assert_eq!(read["title"], json!("Seed treatment"));
        assert_eq!(read["generalM"], json!(12));
        assert_eq!(read["generalF"], json!(0));
        assert_eq!(read["startDate"], json!("2024-03-05"));
        assert_eq!(read["kvkId"], json!(5));
        assert_eq!(read["kvkName"], json!("KVK Ludhiana"));
        assert!(read["createdAt"].is_string());
    }

    #[test]
    fn test_reference_name_is_created_once() {
        let repo = setup();
        let first = create(&repo, &OFT, 5, json!({ "title": "A", "crop": "Mustard" }));
        let second = create(&repo, &OFT, 5, json!({ "title": "B", "nameOfCrop": "mustard" }));

        assert_eq!(first["cropId"], second["cropId"]);
        assert_eq!(first["cropName"], json!("Mustard"));

        let page = repo.find_all(&OFT, None, &ListOptions::default()).unwrap();
        assert_eq!(page.total, 2);
    }

    #[test]
    fn test_unknown_reference_id_is_rejected() {
        let repo = setup();
        let normalized = input(&OFT, json!({ "title": "A", "cropId": 999 }), WriteMode::Create);
        let err = repo.create(&OFT, 5, &normalized.row, None).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_unknown_kvk_is_rejected() {
        let repo = setup();
        let normalized = input(&TRAINING, json!({ "title": "A" }), WriteMode::Create);
        assert!(matches!(
            repo.create(&TRAINING, 42, &normalized.row, None),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_foreign_rows_look_absent() {
        let repo = setup();
        let foreign = create(&repo, &TRAINING, 7, json!({ "title": "Other KVK" }));
        let id = foreign["trainingId"].as_i64().unwrap();

        assert!(repo.find_by_id(&TRAINING, id, Some(5)).unwrap().is_none());
        assert!(repo.find_by_id(&TRAINING, id + 100, Some(5)).unwrap().is_none());

        let changes = FormChanges {
            kvk_id: None,
            row: input(&TRAINING, json!({ "venue": "Hall" }), WriteMode::Update).row,
            details: None,
        };
        assert!(repo.update(&TRAINING, id, Some(5), &changes).unwrap().is_none());
        assert!(!repo.delete(&TRAINING, id, Some(5)).unwrap());

        // Still there for its own KVK
        assert!(repo.find_by_id(&TRAINING, id, Some(7)).unwrap().is_some());
    }

    #[test]
    fn test_find_all_is_scoped_and_paginated() {
        let repo = setup();
        for i in 0..3 {
            create(&repo, &TRAINING, 5, json!({ "title": format!("Own {}", i) }));
        }
        create(&repo, &TRAINING, 7, json!({ "title": "Foreign" }));

        let own = repo
            .find_all(
                &TRAINING,
                Some(5),
                &ListOptions {
                    limit: Some(2),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(own.total, 3);
        assert_eq!(own.rows.len(), 2);
        // Newest first
        assert_eq!(own.rows[0]["title"], json!("Own 2"));

        let all = repo.find_all(&TRAINING, None, &ListOptions::default()).unwrap();
        assert_eq!(all.total, 4);
    }

    #[test]
    fn test_update_changes_only_supplied_fields() {
        let repo = setup();
        let body = json!({ "title": "IPM", "venue": "Farm", "obc_m": 4 });
        let created = create(&repo, &TRAINING, 5, body);
        let id = created["trainingId"].as_i64().unwrap();

        let changes = FormChanges {
            kvk_id: None,
            row: input(
                &TRAINING,
                json!({ "venue": "Campus hall", "obcM": "" }),
                WriteMode::Update,
            )
            .row,
            details: None,
        };
        let updated = repo.update(&TRAINING, id, Some(5), &changes).unwrap().unwrap();

        assert_eq!(updated["title"], json!("IPM"));
        assert_eq!(updated["venue"], json!("Campus hall"));
        assert_eq!(updated["obcM"], json!(0));
    }

    #[test]
    fn test_detail_rows_written_and_replaced() {
        let repo = setup();
        let created = create(
            &repo,
            &CSISA,
            5,
            json!({
                "year": 2024,
                "cropDetails": [
                    { "crop": "Rice", "area": 2 },
                    { "crop": "Wheat", "yield": 40.5 }
                ]
            }),
        );
        let id = created["csisaId"].as_i64().unwrap();
        let details = created["cropDetails"].as_array().unwrap();
        assert_eq!(details.len(), 2);
        assert_eq!(details[0]["cropName"], json!("Rice"));
        assert_eq!(details[1]["yieldQha"], json!(40.5));

        // Details omitted: kept
        let keep = input(&CSISA, json!({ "remarks": "ok" }), WriteMode::Update);
        let kept = repo
            .update(
                &CSISA,
                id,
                None,
                &FormChanges {
                    kvk_id: None,
                    row: keep.row,
                    details: keep.details,
                },
            )
            .unwrap()
            .unwrap();
        assert_eq!(kept["cropDetails"].as_array().unwrap().len(), 2);

        // Details supplied: replaced
        let replace = input(
            &CSISA,
            json!({ "crops": [{ "cropId": details[0]["cropId"] }] }),
            WriteMode::Update,
        );
        let replaced = repo
            .update(
                &CSISA,
                id,
                None,
                &FormChanges {
                    kvk_id: None,
                    row: replace.row,
                    details: replace.details,
                },
            )
            .unwrap()
            .unwrap();
        let rows = replaced["cropDetails"].as_array().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["cropName"], json!("Rice"));
    }

    #[test]
    fn test_failed_detail_rolls_back_header() {
        let repo = setup();
        let normalized = input(
            &CSISA,
            json!({ "year": 2024, "cropDetails": [{ "cropId": 12345 }] }),
            WriteMode::Create,
        );
        assert!(repo
            .create(&CSISA, 5, &normalized.row, normalized.details.as_deref())
            .is_err());

        let page = repo.find_all(&CSISA, None, &ListOptions::default()).unwrap();
        assert_eq!(page.total, 0);
    }

    #[test]
    fn test_delete_removes_row_and_details() {
        let repo = setup();
        let created = create(
            &repo,
            &CSISA,
            5,
            json!({ "year": 2023, "cropDetails": [{ "crop": "Maize" }] }),
        );
        let id = created["csisaId"].as_i64().unwrap();

        assert!(repo.delete(&CSISA, id, Some(5)).unwrap());
        assert!(repo.find_by_id(&CSISA, id, None).unwrap().is_none());
        assert!(!repo.delete(&CSISA, id, None).unwrap());
    }

    #[test]
    fn test_celebration_joins_day_name() {
        let repo = setup();
        let created = create(
            &repo,
            &CELEBRATIONS,
            5,
            json!({ "dayName": "World Food Day", "participants": "120" }),
        );
        assert_eq!(created["importantDayName"], json!("World Food Day"));
        assert_eq!(created["participants"], json!(120));
    }
}
