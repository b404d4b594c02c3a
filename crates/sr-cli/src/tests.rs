//! Argument-handling tests for the `saferoute` binary.

#[cfg(test)]
mod args {
    use std::path::PathBuf;

    use clap::{CommandFactory, Parser};

    use crate::{Cli, Command, parse_point, resolve_config};

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_points() {
        assert_eq!(parse_point("40.71,-74.0").unwrap(), [40.71, -74.0]);
        assert_eq!(parse_point(" 1 , 2 ").unwrap(), [1.0, 2.0]);
        assert!(parse_point("40.71").is_err());
        assert!(parse_point("north,east").is_err());
    }

    #[test]
    fn route_subcommand() {
        let cli = Cli::try_parse_from([
            "saferoute", "route", "--start", "40.7,-74.0", "--end", "40.8,-73.9", "--mode", "safe",
        ])
        .unwrap();
        match cli.command {
            Command::Route { start, end, mode } => {
                assert_eq!(start, [40.7, -74.0]);
                assert_eq!(end, [40.8, -73.9]);
                assert_eq!(mode, "safe");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn flags_override_config() {
        let cli = Cli::try_parse_from([
            "saferoute", "--graph", "g.json", "--zones", "z.csv", "--cache", "g.srgc", "zones",
        ])
        .unwrap();
        let config = resolve_config(&cli).unwrap();
        assert_eq!(config.graph_path, Some(PathBuf::from("g.json")));
        assert_eq!(config.zones_path, Some(PathBuf::from("z.csv")));
        assert_eq!(config.graph_cache_path, Some(PathBuf::from("g.srgc")));
    }
}
