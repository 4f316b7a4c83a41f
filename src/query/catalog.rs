//! Catalog of analytical query templates.
//!
//! Shapes: unconditional aggregates, filtered aggregates (a bound literal
//! in the pattern), projections with an OPTIONAL crash-event join, and
//! projections with a mandatory join plus FILTER. Top-1 templates
//! (`LIMIT 1` after `ORDER BY DESC`) break ties by the evaluator's natural
//! order, so which of several equally ranked groups comes back is not
//! deterministic.

use crate::normalize::RowLayout;
use crate::query::params::ParamSpec;
use crate::query::template::QueryTemplate;

/// All templates, in the order they are listed to callers.
pub static TEMPLATES: &[QueryTemplate] = &[
    QueryTemplate {
        name: "most-crashed-model-in-fog",
        description: "Drone model with the most crashes in fog",
        legacy_route: "/query",
        param: None,
        layout: RowLayout::Positional,
        body: r#"
SELECT ?model (COUNT(?model) AS ?crashCount) WHERE {
  ?drone rdf:type onto:Drone .
  ?drone onto:involvedInCrash ?crashEvent .
  ?crashEvent onto:weather "Fog" .
  ?drone onto:model ?model .
}
GROUP BY ?model
ORDER BY DESC(?crashCount)
LIMIT 1
"#,
    },
    QueryTemplate {
        name: "model-and-location",
        description: "Model and crash location for every crash",
        legacy_route: "/modelAndLocation",
        param: None,
        layout: RowLayout::Positional,
        body: r#"
SELECT ?model ?location WHERE {
  ?drone rdf:type onto:Drone .
  ?drone onto:involvedInCrash ?crashEvent .
  ?drone onto:model ?model .
  ?crashEvent onto:location ?location .
}
"#,
    },
    QueryTemplate {
        name: "count-by-weather",
        description: "Number of crashes per weather condition",
        legacy_route: "/countByAllWeatherConditions",
        param: None,
        layout: RowLayout::Positional,
        body: r#"
SELECT ?weather (COUNT(?crashEvent) AS ?crashCount) WHERE {
  ?drone rdf:type onto:Drone .
  ?drone onto:involvedInCrash ?crashEvent .
  ?crashEvent onto:location ?location .
  ?crashEvent onto:weather ?weather .
}
GROUP BY ?weather
"#,
    },
    QueryTemplate {
        name: "model-with-most-crashes-by-weather",
        description: "Drone model with the most crashes in the given weather",
        legacy_route: "/countModelBySpecificWeatherCondition",
        param: Some(ParamSpec::path("weather_condition")),
        layout: RowLayout::Named,
        body: r#"
SELECT ?model (COUNT(?model) AS ?crashCount) WHERE {
  ?drone rdf:type onto:Drone .
  ?drone onto:involvedInCrash ?crashEvent .
  ?crashEvent onto:weather %value% .
  ?drone onto:model ?model .
}
GROUP BY ?model
ORDER BY DESC(?crashCount)
LIMIT 1
"#,
    },
    QueryTemplate {
        name: "count-crashes-by-weather",
        description: "Number of crashes in the given weather",
        legacy_route: "/countCrashedEventsBySpecificWeatherCondition",
        param: Some(ParamSpec::path("weather_condition")),
        layout: RowLayout::Positional,
        body: r#"
SELECT (COUNT(?crashEvent) AS ?crashCount) WHERE {
  ?drone rdf:type onto:Drone .
  ?drone onto:involvedInCrash ?crashEvent .
  ?crashEvent onto:weather %value% .
}
"#,
    },
    QueryTemplate {
        name: "model-with-most-crashes",
        description: "Drone model with the most crashes overall",
        legacy_route: "/whichModelHasMostCrashes",
        param: None,
        layout: RowLayout::Positional,
        body: r#"
SELECT ?model (COUNT(?crashEvent) AS ?crashCount) WHERE {
  ?drone rdf:type onto:Drone .
  ?drone onto:involvedInCrash ?crashEvent .
  ?drone onto:model ?model .
}
GROUP BY ?model
ORDER BY DESC(?crashCount)
LIMIT 1
"#,
    },
    QueryTemplate {
        name: "count-by-model-and-operator",
        description: "Number of crashes per model and operator",
        legacy_route: "/countModelAndOperatorInvolvedInCrash",
        param: None,
        layout: RowLayout::Positional,
        body: r#"
SELECT ?model ?operator (COUNT(*) AS ?crashCount) WHERE {
  ?drone rdf:type onto:Drone .
  ?drone onto:involvedInCrash ?crashEvent .
  ?drone onto:model ?model .
  ?drone onto:operator ?operator .
}
GROUP BY ?model ?operator
ORDER BY ?model
"#,
    },
    QueryTemplate {
        name: "count-by-phase",
        description: "Number of crash events per flight phase",
        legacy_route: "/countAllCrashedByPhase",
        param: None,
        layout: RowLayout::Positional,
        body: r#"
SELECT ?phase (COUNT(?crashEvent) AS ?crashCount) WHERE {
  ?crashEvent rdf:type onto:CrashEvent .
  ?crashEvent onto:phase ?phase .
}
GROUP BY ?phase
"#,
    },
    QueryTemplate {
        name: "phase-with-most-crashes",
        description: "Flight phase with the most crash events",
        legacy_route: "/phaseWithMostCrashedEvents",
        param: None,
        layout: RowLayout::Positional,
        body: r#"
SELECT ?phase (COUNT(?crashEvent) AS ?crashCount) WHERE {
  ?crashEvent rdf:type onto:CrashEvent .
  ?crashEvent onto:phase ?phase .
}
GROUP BY ?phase
ORDER BY DESC(?crashCount)
LIMIT 1
"#,
    },
    QueryTemplate {
        name: "all-data",
        description: "Every drone with its crash events; drones without crashes have null event fields",
        legacy_route: "/getAllData",
        param: None,
        layout: RowLayout::Named,
        body: r#"
SELECT ?model ?operator ?date ?location ?phase ?weather WHERE {
  ?drone rdf:type onto:Drone .
  ?drone onto:model ?model .
  ?drone onto:operator ?operator .
  OPTIONAL {
    ?drone onto:involvedInCrash ?crashEvent .
    ?crashEvent onto:date ?date .
    ?crashEvent onto:location ?location .
    ?crashEvent onto:phase ?phase .
    ?crashEvent onto:weather ?weather .
  }
}
ORDER BY ?drone
"#,
    },
    QueryTemplate {
        name: "filter-by-phase",
        description: "Drones and crash events in the given flight phase",
        legacy_route: "/filterDataByPhase",
        param: Some(ParamSpec::path("phase")),
        layout: RowLayout::Named,
        body: r#"
SELECT ?model ?operator ?date ?location ?phase ?weather WHERE {
  ?drone rdf:type onto:Drone .
  ?drone onto:model ?model .
  ?drone onto:operator ?operator .
  ?drone onto:involvedInCrash ?crashEvent .
  ?crashEvent onto:date ?date .
  ?crashEvent onto:location ?location .
  ?crashEvent onto:phase ?phase .
  ?crashEvent onto:weather ?weather .
  FILTER(?phase = %value%)
}
ORDER BY ?drone
"#,
    },
    QueryTemplate {
        name: "filter-by-date",
        description: "Drones and crash events on the given date",
        legacy_route: "/filterDataByDate",
        param: Some(ParamSpec::query("date")),
        layout: RowLayout::Named,
        body: r#"
SELECT ?model ?operator ?date ?location ?phase ?weather WHERE {
  ?drone rdf:type onto:Drone .
  ?drone onto:model ?model .
  ?drone onto:operator ?operator .
  ?drone onto:involvedInCrash ?crashEvent .
  ?crashEvent onto:date ?date .
  ?crashEvent onto:location ?location .
  ?crashEvent onto:phase ?phase .
  ?crashEvent onto:weather ?weather .
  FILTER(?date = %value%)
}
ORDER BY ?drone
"#,
    },
    QueryTemplate {
        name: "filter-by-weather",
        description: "Drones and crash events in the given weather",
        legacy_route: "/filterAllDataWithWeatherCondition",
        param: Some(ParamSpec::path("weather_condition")),
        layout: RowLayout::Named,
        body: r#"
SELECT ?model ?operator ?date ?location ?phase ?weather WHERE {
  ?drone rdf:type onto:Drone .
  ?drone onto:model ?model .
  ?drone onto:operator ?operator .
  ?drone onto:involvedInCrash ?crashEvent .
  ?crashEvent onto:date ?date .
  ?crashEvent onto:location ?location .
  ?crashEvent onto:phase ?phase .
  ?crashEvent onto:weather ?weather .
  FILTER(?weather = %value%)
}
ORDER BY ?drone
"#,
    },
    QueryTemplate {
        name: "model-and-operator-by-phase",
        description: "Operator and model with the most crashes in the given flight phase",
        legacy_route: "/getModelAndOperatorByPhase",
        param: Some(ParamSpec::path("phase")),
        layout: RowLayout::Named,
        body: r#"
SELECT ?operator ?model (COUNT(?crashEvent) AS ?crashCount) WHERE {
  ?drone rdf:type onto:Drone .
  ?drone onto:model ?model .
  ?drone onto:operator ?operator .
  ?drone onto:involvedInCrash ?crashEvent .
  ?crashEvent onto:phase %value% .
}
GROUP BY ?operator ?model
ORDER BY DESC(?crashCount)
LIMIT 1
"#,
    },
    QueryTemplate {
        name: "model-and-operator-by-weather",
        description: "Operator and model with the most crashes in the given weather",
        legacy_route: "/getModelAndOperatorByWeather",
        param: Some(ParamSpec::path("weather_condition")),
        layout: RowLayout::Named,
        body: r#"
SELECT ?operator ?model (COUNT(?crashEvent) AS ?crashCount) WHERE {
  ?drone rdf:type onto:Drone .
  ?drone onto:model ?model .
  ?drone onto:operator ?operator .
  ?drone onto:involvedInCrash ?crashEvent .
  ?crashEvent onto:weather %value% .
}
GROUP BY ?operator ?model
ORDER BY DESC(?crashCount)
LIMIT 1
"#,
    },
    QueryTemplate {
        name: "operator-with-most-crashes-by-weather",
        description: "Operator with the most crashes in the given weather",
        legacy_route: "/getOperatorWithMostCrashedByWeather",
        param: Some(ParamSpec::path("weather_condition")),
        layout: RowLayout::Named,
        body: r#"
SELECT ?operator (COUNT(?crashEvent) AS ?crashCount) WHERE {
  ?drone rdf:type onto:Drone .
  ?drone onto:operator ?operator .
  ?drone onto:involvedInCrash ?crashEvent .
  ?crashEvent onto:weather %value% .
}
GROUP BY ?operator
ORDER BY DESC(?crashCount)
LIMIT 1
"#,
    },
    QueryTemplate {
        name: "count-by-location",
        description: "Number of crashes per location",
        legacy_route: "/getLocationWithCrashedEvents",
        param: None,
        layout: RowLayout::Named,
        body: r#"
SELECT (COUNT(?crashEvent) AS ?crashCount) ?location WHERE {
  ?drone onto:involvedInCrash ?crashEvent .
  ?crashEvent onto:location ?location .
}
GROUP BY ?location
"#,
    },
    QueryTemplate {
        name: "location-with-most-crashes",
        description: "Location with the most crash events",
        legacy_route: "/getLocationWithMostCrashedEvents",
        param: None,
        layout: RowLayout::Named,
        body: r#"
SELECT ?location (COUNT(?crashEvent) AS ?crashCount) WHERE {
  ?crashEvent onto:location ?location .
}
GROUP BY ?location
ORDER BY DESC(?crashCount)
LIMIT 1
"#,
    },
    QueryTemplate {
        name: "model-and-operator-by-location",
        description: "Model and operator with the most crashes at the given location",
        legacy_route: "/getOperatorAndModelMostCrashedEventsInSpecificLocation",
        param: Some(ParamSpec::path("location")),
        layout: RowLayout::Named,
        body: r#"
SELECT ?model ?operator (COUNT(?crashEvent) AS ?crashCount) WHERE {
  ?drone rdf:type onto:Drone .
  ?drone onto:model ?model .
  ?drone onto:operator ?operator .
  ?drone onto:involvedInCrash ?crashEvent .
  ?crashEvent onto:location %value% .
}
GROUP BY ?model ?operator
ORDER BY DESC(?crashCount)
LIMIT 1
"#,
    },
    QueryTemplate {
        name: "location-with-most-crashes-by-model",
        description: "Location where the given model crashed most",
        legacy_route: "/getInWhichLocationHasMostCrashedFilterByModel",
        param: Some(ParamSpec::path("model")),
        layout: RowLayout::Named,
        body: r#"
SELECT ?location (COUNT(?crashEvent) AS ?crashCount) WHERE {
  ?drone rdf:type onto:Drone .
  ?drone onto:model %value% .
  ?drone onto:involvedInCrash ?crashEvent .
  ?crashEvent onto:location ?location .
}
GROUP BY ?location
ORDER BY DESC(?crashCount)
LIMIT 1
"#,
    },
];

/// Look up a template by operation name.
pub fn find(name: &str) -> Option<&'static QueryTemplate> {
    TEMPLATES.iter().find(|t| t.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::{normalize, ResultShape};
    use crate::query::template::PLACEHOLDER;
    use crate::store::Graph;
    use crate::test_support::{fixture_graph, ONTO};
    use std::collections::HashSet;

    fn run(graph: &Graph, name: &str, value: Option<&str>) -> Vec<crate::normalize::Record> {
        let template = find(name).unwrap();
        let query = template.prepare(ONTO, value).unwrap();
        let results = graph.select(&query).unwrap();
        normalize(&ResultShape::from_layout(template.layout, &results), &results)
    }

    #[test]
    fn test_names_and_routes_are_unique() {
        let names: HashSet<_> = TEMPLATES.iter().map(|t| t.name).collect();
        let routes: HashSet<_> = TEMPLATES.iter().map(|t| t.legacy_route).collect();
        assert_eq!(names.len(), TEMPLATES.len());
        assert_eq!(routes.len(), TEMPLATES.len());
        assert_eq!(TEMPLATES.len(), 20);
    }

    #[test]
    fn test_placeholder_matches_parameter() {
        for template in TEMPLATES {
            assert_eq!(
                template.body.contains(PLACEHOLDER),
                template.param.is_some(),
                "template {}",
                template.name
            );
        }
    }

    #[test]
    fn test_every_template_evaluates() {
        let graph = fixture_graph();
        for template in TEMPLATES {
            let value = template.param.map(|_| "fog");
            let query = template.prepare(ONTO, value).unwrap();
            assert!(graph.select(&query).is_ok(), "template {}", template.name);
        }
    }

    #[test]
    fn test_model_with_most_crashes_by_weather_fog() {
        let records = run(&fixture_graph(), "model-with-most-crashes-by-weather", Some("fog"));
        assert_eq!(
            serde_json::to_string(&records).unwrap(),
            r#"[{"model":"X100","crashCount":"2"}]"#
        );
    }

    #[test]
    fn test_model_with_most_crashes_by_weather_no_match() {
        let records = run(&fixture_graph(), "model-with-most-crashes-by-weather", Some("sunny"));
        assert!(records.is_empty());
    }

    #[test]
    fn test_filtered_aggregate_uses_capitalized_value() {
        let records = run(&fixture_graph(), "model-with-most-crashes-by-weather", Some("heavy Rain/Snow"));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].value("model"), Some("Falcon"));
        assert_eq!(records[0].value("crashCount"), Some("2"));
    }

    #[test]
    fn test_most_crashed_model_in_fog_is_positional() {
        let records = run(&fixture_graph(), "most-crashed-model-in-fog", None);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].value("subject"), Some("X100"));
        assert_eq!(records[0].value("property"), Some("2"));
        assert_eq!(records[0].get("object"), Some(&None));
    }

    #[test]
    fn test_model_and_location_lists_every_crash() {
        let records = run(&fixture_graph(), "model-and-location", None);
        assert_eq!(records.len(), 5);
        assert!(records.iter().all(|r| r.get("object") == Some(&None)));
    }

    #[test]
    fn test_count_by_weather() {
        let records = run(&fixture_graph(), "count-by-weather", None);
        let counts: HashSet<_> = records
            .iter()
            .map(|r| (r.value("subject").unwrap(), r.value("property").unwrap()))
            .collect();
        assert_eq!(counts, HashSet::from([("Fog", "2"), ("Heavy Rain/Snow", "3")]));
    }

    #[test]
    fn test_count_crashes_by_weather() {
        let graph = fixture_graph();
        let fog = run(&graph, "count-crashes-by-weather", Some("fog"));
        assert_eq!(fog.len(), 1);
        assert_eq!(fog[0].value("subject"), Some("2"));

        // An ungrouped COUNT still yields one row.
        let sunny = run(&graph, "count-crashes-by-weather", Some("sunny"));
        assert_eq!(sunny[0].value("subject"), Some("0"));
    }

    #[test]
    fn test_model_with_most_crashes() {
        let records = run(&fixture_graph(), "model-with-most-crashes", None);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].value("subject"), Some("X100"));
        assert_eq!(records[0].value("property"), Some("3"));
    }

    #[test]
    fn test_count_by_model_and_operator() {
        let records = run(&fixture_graph(), "count-by-model-and-operator", None);
        assert_eq!(records.len(), 3);
        // Ordered by model.
        assert_eq!(records[0].value("subject"), Some("Falcon"));
        assert_eq!(records[0].value("object"), Some("2"));
        assert!(records.iter().all(|r| r.value("subject") != Some("Hawk")));
    }

    #[test]
    fn test_count_by_phase_and_top_phase() {
        let graph = fixture_graph();
        let counts: HashSet<_> = run(&graph, "count-by-phase", None)
            .iter()
            .map(|r| {
                (
                    r.value("subject").unwrap().to_string(),
                    r.value("property").unwrap().to_string(),
                )
            })
            .collect();
        assert_eq!(counts.len(), 3);
        assert!(counts.contains(&("Landing".to_string(), "3".to_string())));

        let top = run(&graph, "phase-with-most-crashes", None);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].value("subject"), Some("Landing"));
    }

    #[test]
    fn test_all_data_keeps_drones_without_crashes() {
        let records = run(&fixture_graph(), "all-data", None);
        assert_eq!(records.len(), 6);

        let hawk: Vec<_> = records
            .iter()
            .filter(|r| r.value("model") == Some("Hawk"))
            .collect();
        assert_eq!(hawk.len(), 1);
        for column in ["date", "location", "phase", "weather"] {
            assert_eq!(hawk[0].get(column), Some(&None), "column {}", column);
        }
        assert_eq!(hawk[0].value("operator"), Some("AeroFleet"));
    }

    #[test]
    fn test_filter_by_phase_excludes_non_matching_drones() {
        let records = run(&fixture_graph(), "filter-by-phase", Some("landing"));
        assert_eq!(records.len(), 3);
        assert!(records.iter().all(|r| r.value("phase") == Some("Landing")));
        assert!(records.iter().all(|r| r.value("model") != Some("Hawk")));
        assert!(records.iter().all(|r| r.value("operator") != Some("AeroFleet")));
    }

    #[test]
    fn test_filter_by_date() {
        let records = run(&fixture_graph(), "filter-by-date", Some("2021-07-02"));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].value("operator"), Some("AeroFleet"));
        assert_eq!(records[0].value("phase"), Some("Takeoff"));
    }

    #[test]
    fn test_filter_by_weather() {
        let records = run(&fixture_graph(), "filter-by-weather", Some("fog"));
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.value("weather") == Some("Fog")));
        assert_eq!(
            records[0].columns().map(|(name, _)| name).collect::<Vec<_>>(),
            ["model", "operator", "date", "location", "phase", "weather"]
        );
    }

    #[test]
    fn test_model_and_operator_by_phase() {
        let records = run(&fixture_graph(), "model-and-operator-by-phase", Some("landing"));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].value("operator"), Some("SkyOps"));
        assert_eq!(records[0].value("model"), Some("Falcon"));
        assert_eq!(records[0].value("crashCount"), Some("2"));
    }

    #[test]
    fn test_top_one_with_tie_returns_single_row() {
        // (SkyOps, X100) and (AeroFleet, X100) both have one fog crash.
        let records = run(&fixture_graph(), "model-and-operator-by-weather", Some("fog"));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].value("model"), Some("X100"));
        assert_eq!(records[0].value("crashCount"), Some("1"));
    }

    #[test]
    fn test_operator_with_most_crashes_by_weather() {
        let records = run(
            &fixture_graph(),
            "operator-with-most-crashes-by-weather",
            Some("Heavy Rain/Snow"),
        );
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].value("operator"), Some("SkyOps"));
        assert_eq!(records[0].value("crashCount"), Some("3"));
    }

    #[test]
    fn test_count_by_location() {
        let records = run(&fixture_graph(), "count-by-location", None);
        assert_eq!(records.len(), 3);
        assert_eq!(
            records[0].columns().map(|(name, _)| name).collect::<Vec<_>>(),
            ["crashCount", "location"]
        );
        let thessaloniki = records
            .iter()
            .find(|r| r.value("location") == Some("Thessaloniki, Greece"))
            .unwrap();
        assert_eq!(thessaloniki.value("crashCount"), Some("1"));
    }

    #[test]
    fn test_location_with_most_crashes() {
        let records = run(&fixture_graph(), "location-with-most-crashes", None);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].value("crashCount"), Some("2"));
    }

    #[test]
    fn test_model_and_operator_by_location_binds_parameter() {
        let records = run(
            &fixture_graph(),
            "model-and-operator-by-location",
            Some("thessaloniki, Greece"),
        );
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].value("model"), Some("Falcon"));
        assert_eq!(records[0].value("operator"), Some("SkyOps"));
    }

    #[test]
    fn test_location_with_most_crashes_by_model() {
        let records = run(&fixture_graph(), "location-with-most-crashes-by-model", Some("x100"));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].value("location"), Some("Komotini, Greece"));
        assert_eq!(records[0].value("crashCount"), Some("2"));
    }

    #[test]
    fn test_top_one_on_empty_graph_returns_no_rows() {
        let graph = Graph::empty().unwrap();
        for name in ["most-crashed-model-in-fog", "model-with-most-crashes", "phase-with-most-crashes"] {
            assert!(run(&graph, name, None).is_empty(), "template {}", name);
        }
    }

    #[test]
    fn test_quoted_parameter_cannot_widen_filter() {
        let records = run(
            &fixture_graph(),
            "filter-by-weather",
            Some("fog\" || \"a\" = \"a"),
        );
        assert!(records.is_empty());
    }

    #[test]
    fn test_repeated_execution_is_stable() {
        let graph = fixture_graph();
        let first = run(&graph, "all-data", None);
        let second = run(&graph, "all-data", None);
        assert_eq!(first, second);
    }
}
