use flora_dataset::TraitTable;
use flora_protocol::AdvisoryKind;
use flora_search::{
    FindRequest, QueryEngine, QueryOutcome, SearchError, TraitFilter, TraitTaxonomy,
};
use pretty_assertions::assert_eq;

fn cell(value: &str) -> Option<String> {
    Some(value.to_string())
}

/// Columns span Descriptive, Botany and Seeds plus one column outside the taxonomy.
fn fixture() -> TraitTable {
    let columns = [
        "species_name",
        "flower_colour",
        "plant_height",
        "ploidy",
        "serotiny",
        "collector_notes",
    ]
    .iter()
    .map(|c| c.to_string())
    .collect();

    let rows = vec![
        vec![
            cell("Telopea speciosissima"),
            cell("Red"),
            cell("2-4 m (tall shrub)"),
            None,
            None,
            cell("waratah"),
        ],
        vec![
            cell("Acacia dealbata"),
            cell("White"),
            None,
            cell("2n"),
            cell("non-serotinous"),
            None,
        ],
        vec![
            cell("Grevillea rosmarinifolia"),
            cell("Red and White"),
            cell("1-2 m"),
            None,
            None,
            None,
        ],
        vec![
            cell("Banksia serrata"),
            None,
            cell("10-16 m"),
            cell("2n"),
            cell("strongly serotinous"),
            cell("old man"),
        ],
        vec![
            cell("Telopea speciosissima"),
            cell("White"),
            None,
            None,
            None,
            cell("second record"),
        ],
    ];

    TraitTable::new(columns, rows, "species_name").unwrap()
}

fn names(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn view_lists_only_populated_groups() {
    let table = fixture();
    let engine = QueryEngine::with_builtin_taxonomy(&table);

    let out = engine
        .view_traits(&names(&["Banksia serrata"]))
        .unwrap()
        .ready()
        .expect("ready output");

    assert_eq!(out.species.len(), 1);
    let profile = &out.species[0];
    assert_eq!(profile.species, "Banksia serrata");

    let groups: Vec<_> = profile.groups.iter().map(|g| g.group.as_str()).collect();
    assert_eq!(groups, ["Botany", "Descriptive", "Seeds"]);

    let descriptive = &profile.groups[1];
    assert_eq!(descriptive.traits.len(), 1);
    assert_eq!(descriptive.traits[0].trait_name, "plant_height");
    assert_eq!(descriptive.traits[0].value, "10-16 m");
}

#[test]
fn view_uses_first_row_and_selection_order() {
    let table = fixture();
    let engine = QueryEngine::with_builtin_taxonomy(&table);

    let out = engine
        .view_traits(&names(&["Telopea speciosissima", "Acacia dealbata"]))
        .unwrap()
        .ready()
        .unwrap();

    let order: Vec<_> = out.species.iter().map(|p| p.species.as_str()).collect();
    assert_eq!(order, ["Telopea speciosissima", "Acacia dealbata"]);

    let telopea = &out.species[0];
    assert_eq!(telopea.groups.len(), 1);
    assert_eq!(telopea.groups[0].group, "Descriptive");
    let values: Vec<_> = telopea.groups[0]
        .traits
        .iter()
        .map(|t| (t.trait_name.as_str(), t.value.as_str()))
        .collect();
    assert_eq!(values, [("flower_colour", "Red"), ("plant_height", "2-4 m")]);
}

#[test]
fn view_without_selection_is_advisory() {
    let table = fixture();
    let engine = QueryEngine::with_builtin_taxonomy(&table);

    let outcome = engine.view_traits(&[]).unwrap();
    let advisory = outcome.advisory().expect("advisory");
    assert_eq!(advisory.kind, AdvisoryKind::NoSelection);
}

#[test]
fn view_rejects_unknown_species() {
    let table = fixture();
    let engine = QueryEngine::with_builtin_taxonomy(&table);

    let err = engine.view_traits(&names(&["Eucalyptus"])).unwrap_err();
    assert_eq!(err, SearchError::UnknownSpecies("Eucalyptus".to_string()));
}

#[test]
fn filterable_traits_follow_groups_and_table_columns() {
    let table = fixture();
    let engine = QueryEngine::with_builtin_taxonomy(&table);

    assert_eq!(
        engine
            .filterable_traits(&names(&["Seeds", "Descriptive"]))
            .unwrap(),
        ["serotiny", "flower_colour", "plant_height"]
    );
    assert!(engine.filterable_traits(&[]).unwrap().is_empty());
    assert!(matches!(
        engine.filterable_traits(&names(&["Roots"])),
        Err(SearchError::UnknownGroup(_))
    ));
}

#[test]
fn available_values_are_sorted_tokens() {
    let table = fixture();
    let engine = QueryEngine::with_builtin_taxonomy(&table);

    assert_eq!(
        engine.available_values("flower_colour").unwrap(),
        ["red", "white"]
    );
    assert_eq!(
        engine.available_values("plant_height").unwrap(),
        ["1", "10", "16 m", "2", "2 m", "4 m"]
    );
    assert!(matches!(
        engine.available_values("collector_notes"),
        Err(SearchError::TraitNotSelectable { .. })
    ));
}

#[test]
fn find_matches_any_token_within_a_trait() {
    let table = fixture();
    let engine = QueryEngine::with_builtin_taxonomy(&table);

    let request = FindRequest {
        groups: names(&["Descriptive"]),
        filters: vec![TraitFilter::new("flower_colour", ["red"])],
    };
    let out = engine.find_by_traits(&request).unwrap().ready().unwrap();

    assert_eq!(out.species_column, "species_name");
    assert_eq!(out.columns, ["flower_colour"]);
    let hits: Vec<_> = out
        .rows
        .iter()
        .map(|r| (r.species.as_deref().unwrap(), r.values[0].as_deref().unwrap()))
        .collect();
    assert_eq!(
        hits,
        [
            ("Telopea speciosissima", "Red"),
            ("Grevillea rosmarinifolia", "Red and White"),
        ]
    );
}

#[test]
fn find_requires_every_trait_to_match() {
    let table = fixture();
    let engine = QueryEngine::with_builtin_taxonomy(&table);

    let request = FindRequest {
        groups: names(&["Descriptive", "Botany"]),
        filters: vec![
            TraitFilter::new("flower_colour", ["white"]),
            TraitFilter::new("ploidy", ["2n"]),
        ],
    };
    let out = engine.find_by_traits(&request).unwrap().ready().unwrap();

    assert_eq!(out.columns, ["flower_colour", "ploidy"]);
    assert_eq!(out.rows.len(), 1);
    assert_eq!(out.rows[0].species.as_deref(), Some("Acacia dealbata"));
    assert_eq!(
        out.rows[0].values,
        [Some("White".to_string()), Some("2n".to_string())]
    );
}

#[test]
fn find_retokenizes_selected_values() {
    let table = fixture();
    let engine = QueryEngine::with_builtin_taxonomy(&table);

    let request = FindRequest {
        groups: names(&["Descriptive"]),
        filters: vec![TraitFilter::new("plant_height", ["1-2 m"])],
    };
    let out = engine.find_by_traits(&request).unwrap().ready().unwrap();
    let species: Vec<_> = out
        .rows
        .iter()
        .filter_map(|r| r.species.as_deref())
        .collect();
    assert_eq!(species, ["Grevillea rosmarinifolia"]);
}

#[test]
fn find_without_values_is_no_selection() {
    let table = fixture();
    let engine = QueryEngine::with_builtin_taxonomy(&table);

    let empty = engine.find_by_traits(&FindRequest::default()).unwrap();
    assert_eq!(empty.advisory().unwrap().kind, AdvisoryKind::NoSelection);

    let request = FindRequest {
        groups: names(&["Descriptive"]),
        filters: vec![TraitFilter::new("flower_colour", Vec::<String>::new())],
    };
    let outcome = engine.find_by_traits(&request).unwrap();
    assert!(!outcome.is_ready());
    assert_eq!(outcome.advisory().unwrap().kind, AdvisoryKind::NoSelection);
}

#[test]
fn find_with_no_hits_is_no_matches() {
    let table = fixture();
    let engine = QueryEngine::with_builtin_taxonomy(&table);

    let request = FindRequest {
        groups: names(&["Descriptive", "Seeds"]),
        filters: vec![
            TraitFilter::new("flower_colour", ["red"]),
            TraitFilter::new("serotiny", ["strongly serotinous"]),
        ],
    };
    let outcome = engine.find_by_traits(&request).unwrap();
    assert_eq!(outcome.advisory().unwrap().kind, AdvisoryKind::NoMatches);
}

#[test]
fn find_rejects_traits_outside_selected_groups() {
    let table = fixture();
    let engine = QueryEngine::with_builtin_taxonomy(&table);

    let request = FindRequest {
        groups: names(&["Seeds"]),
        filters: vec![TraitFilter::new("flower_colour", ["red"])],
    };
    assert_eq!(
        engine.find_by_traits(&request).unwrap_err(),
        SearchError::TraitNotSelectable {
            trait_name: "flower_colour".to_string()
        }
    );
}

#[test]
fn find_rejects_values_outside_the_value_set() {
    let table = fixture();
    let engine = QueryEngine::with_builtin_taxonomy(&table);

    let request = FindRequest {
        groups: names(&["Descriptive"]),
        filters: vec![TraitFilter::new("flower_colour", ["blue"])],
    };
    assert!(matches!(
        engine.find_by_traits(&request),
        Err(SearchError::UnknownValue { ref value, .. }) if value == "blue"
    ));
}

#[test]
fn find_accepts_mixed_case_values() {
    let table = fixture();
    let engine = QueryEngine::with_builtin_taxonomy(&table);

    let request = FindRequest {
        groups: names(&["Descriptive"]),
        filters: vec![TraitFilter::new("flower_colour", ["WHITE"])],
    };
    let out = engine.find_by_traits(&request).unwrap().ready().unwrap();
    assert_eq!(out.rows.len(), 3);
}

#[test]
fn flower_colour_scenario_from_four_rows() {
    let table = TraitTable::new(
        names(&["species_name", "flower_colour"]),
        vec![
            vec![cell("A"), cell("Red")],
            vec![cell("B"), cell("White")],
            vec![cell("C"), cell("Red and White")],
            vec![cell("D"), None],
        ],
        "species_name",
    )
    .unwrap();
    let engine = QueryEngine::with_builtin_taxonomy(&table);

    let request = FindRequest {
        groups: names(&["Descriptive"]),
        filters: vec![TraitFilter::new("flower_colour", ["red"])],
    };
    let out = engine.find_by_traits(&request).unwrap().ready().unwrap();
    let species: Vec<_> = out.rows.iter().filter_map(|r| r.species.as_deref()).collect();
    assert_eq!(species, ["A", "C"]);
}

#[test]
fn compare_returns_all_columns_in_table_order() {
    let table = fixture();
    let engine = QueryEngine::with_builtin_taxonomy(&table);

    let out = engine
        .compare_species(&names(&["Banksia serrata", "Acacia dealbata"]))
        .unwrap()
        .ready()
        .unwrap();

    assert_eq!(
        out.columns,
        [
            "flower_colour",
            "plant_height",
            "ploidy",
            "serotiny",
            "collector_notes"
        ]
    );
    let order: Vec<_> = out.rows.iter().map(|r| r.species.as_str()).collect();
    assert_eq!(order, ["Acacia dealbata", "Banksia serrata"]);
    assert_eq!(out.rows[1].values[4].as_deref(), Some("old man"));
}

#[test]
fn compare_is_independent_of_selection_order() {
    let table = fixture();
    let engine = QueryEngine::with_builtin_taxonomy(&table);

    let forward = engine
        .compare_species(&names(&["Acacia dealbata", "Banksia serrata"]))
        .unwrap();
    let backward = engine
        .compare_species(&names(&["Banksia serrata", "Acacia dealbata"]))
        .unwrap();
    assert_eq!(forward, backward);
}

#[test]
fn compare_keeps_duplicate_species_rows() {
    let table = fixture();
    let engine = QueryEngine::with_builtin_taxonomy(&table);

    let out = engine
        .compare_species(&names(&["Telopea speciosissima"]))
        .unwrap()
        .ready()
        .unwrap();
    assert_eq!(out.rows.len(), 2);
    assert_eq!(out.rows[1].values[0].as_deref(), Some("White"));
}

#[test]
fn compare_without_selection_is_advisory() {
    let table = fixture();
    let engine = QueryEngine::with_builtin_taxonomy(&table);

    match engine.compare_species(&[]).unwrap() {
        QueryOutcome::Advisory(advisory) => {
            assert_eq!(advisory.kind, AdvisoryKind::NoSelection)
        }
        QueryOutcome::Ready(_) => panic!("expected advisory"),
    }
}

#[test]
fn custom_taxonomy_controls_grouping() {
    let table = fixture();
    let taxonomy = TraitTaxonomy::from_json(
        r#"{"groups":[{"name":"Looks","traits":["flower_colour","collector_notes"]}]}"#,
    )
    .unwrap();
    let engine = QueryEngine::new(&table, &taxonomy);

    let out = engine
        .view_traits(&names(&["Telopea speciosissima"]))
        .unwrap()
        .ready()
        .unwrap();
    assert_eq!(out.species[0].groups.len(), 1);
    assert_eq!(out.species[0].groups[0].traits.len(), 2);
}
