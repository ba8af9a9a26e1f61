//! Text rendering of a [`DumpDocument`].

use std::fmt::{self, Write};

use crate::document::{DumpDocument, TableDump};
use crate::sql::quote_identifier;

/// Format of the trailing `Dump completed on` comment.
pub const COMPLETED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const SESSION_PREAMBLE: &[&str] = &[
    "/*!40101 SET @OLD_CHARACTER_SET_CLIENT=@@CHARACTER_SET_CLIENT */;",
    "/*!40101 SET @OLD_CHARACTER_SET_RESULTS=@@CHARACTER_SET_RESULTS */;",
    "/*!40101 SET @OLD_COLLATION_CONNECTION=@@COLLATION_CONNECTION */;",
    "/*!40101 SET NAMES utf8 */;",
    "/*!40103 SET @OLD_TIME_ZONE=@@TIME_ZONE */;",
    "/*!40103 SET TIME_ZONE='+00:00' */;",
    "/*!40014 SET @OLD_UNIQUE_CHECKS=@@UNIQUE_CHECKS, UNIQUE_CHECKS=0 */;",
    "/*!40014 SET @OLD_FOREIGN_KEY_CHECKS=@@FOREIGN_KEY_CHECKS, FOREIGN_KEY_CHECKS=0 */;",
    "/*!40101 SET @OLD_SQL_MODE=@@SQL_MODE, SQL_MODE='NO_AUTO_VALUE_ON_ZERO' */;",
    "/*!40111 SET @OLD_SQL_NOTES=@@SQL_NOTES, SQL_NOTES=0 */;",
];

/// Render the full dump text.
pub fn render(doc: &DumpDocument) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = render_to(&mut out, doc);
    out
}

/// Render the dump into `out`, in the same order as [`render`].
pub fn render_to<W: Write>(out: &mut W, doc: &DumpDocument) -> fmt::Result {
    let database = quote_identifier(&doc.database);

    writeln!(out, "-- mydump SQL Dump {}", doc.tool_version)?;
    writeln!(out, "--")?;
    writeln!(out, "-- ------------------------------------------------------")?;
    writeln!(out, "-- Server version\t{}", doc.server_version)?;
    writeln!(out)?;
    for line in SESSION_PREAMBLE {
        writeln!(out, "{line}")?;
    }
    writeln!(out)?;
    writeln!(out)?;
    writeln!(out, "DROP DATABASE IF EXISTS {database};")?;
    writeln!(out)?;
    writeln!(out, "{};", doc.database_sql)?;
    writeln!(out)?;
    writeln!(out, "USE {database};")?;
    writeln!(out)?;

    for table in &doc.tables {
        render_table(out, table)?;
    }

    writeln!(
        out,
        "\n-- Dump completed on {}",
        doc.completed_at.format(COMPLETED_AT_FORMAT)
    )
}

fn render_table<W: Write>(out: &mut W, table: &TableDump) -> fmt::Result {
    let name = quote_identifier(&table.name);

    writeln!(out)?;
    writeln!(out, "--")?;
    writeln!(out, "-- Table structure for table {name}")?;
    writeln!(out, "--")?;
    writeln!(out)?;
    writeln!(out, "DROP TABLE IF EXISTS {name};")?;
    writeln!(out, "/*!40101 SET @saved_cs_client     = @@character_set_client */;")?;
    writeln!(out, "/*!40101 SET character_set_client = utf8 */;")?;
    writeln!(out, "{};", table.create_sql)?;
    writeln!(out, "/*!40101 SET character_set_client = @saved_cs_client */;")?;
    writeln!(out, "--")?;
    writeln!(out, "-- Dumping data for table {name}")?;
    writeln!(out, "--")?;
    writeln!(out)?;
    writeln!(out, "LOCK TABLES {name} WRITE;")?;
    writeln!(out, "/*!40000 ALTER TABLE {name} DISABLE KEYS */;")?;
    writeln!(out)?;
    for batch in table.insert_batches() {
        writeln!(out, "INSERT INTO {name} VALUES {batch};")?;
    }
    writeln!(out)?;
    writeln!(out)?;
    writeln!(out, "/*!40000 ALTER TABLE {name} ENABLE KEYS */;")?;
    writeln!(out, "UNLOCK TABLES;")
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn document(tables: Vec<TableDump>) -> DumpDocument {
        DumpDocument {
            tool_version: "0.1.0".to_string(),
            server_version: "8.0.36".to_string(),
            database: "shop".to_string(),
            database_sql: "CREATE DATABASE `shop`".to_string(),
            tables,
            completed_at: Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap(),
        }
    }

    fn table(name: &str, batches: &[&str]) -> TableDump {
        TableDump {
            name: name.to_string(),
            create_sql: format!("CREATE TABLE `{name}` (`id` int)"),
            batches: batches.iter().map(|batch| batch.to_string()).collect(),
        }
    }

    #[test]
    fn renders_header_and_database_block() {
        let text = render(&document(Vec::new()));
        let expected_head = "-- mydump SQL Dump 0.1.0\n--\n-- ------------------------------------------------------\n-- Server version\t8.0.36\n\n/*!40101 SET @OLD_CHARACTER_SET_CLIENT=@@CHARACTER_SET_CLIENT */;\n";
        assert!(text.starts_with(expected_head));
        assert!(text.contains(
            "/*!40111 SET @OLD_SQL_NOTES=@@SQL_NOTES, SQL_NOTES=0 */;\n\n\nDROP DATABASE IF EXISTS `shop`;\n\nCREATE DATABASE `shop`;\n\nUSE `shop`;\n\n"
        ));
        assert!(text.ends_with("\n-- Dump completed on 2024-05-06 07:08:09\n"));
    }

    #[test]
    fn renders_table_block_in_order() {
        let text = render(&document(vec![table("t", &["('1','a'),('2',null)", ""])]));
        let expected = "\n--\n-- Table structure for table `t`\n--\n\nDROP TABLE IF EXISTS `t`;\n/*!40101 SET @saved_cs_client     = @@character_set_client */;\n/*!40101 SET character_set_client = utf8 */;\nCREATE TABLE `t` (`id` int);\n/*!40101 SET character_set_client = @saved_cs_client */;\n--\n-- Dumping data for table `t`\n--\n\nLOCK TABLES `t` WRITE;\n/*!40000 ALTER TABLE `t` DISABLE KEYS */;\n\nINSERT INTO `t` VALUES ('1','a'),('2',null);\n\n\n/*!40000 ALTER TABLE `t` ENABLE KEYS */;\nUNLOCK TABLES;\n";
        assert!(text.contains(expected), "unexpected table block:\n{text}");
    }

    #[test]
    fn skips_empty_batches() {
        let text = render(&document(vec![table("empty", &[""])]));
        assert!(!text.contains("INSERT INTO"));
        assert!(text.contains("LOCK TABLES `empty` WRITE;"));
    }

    #[test]
    fn keeps_table_order() {
        let text = render(&document(vec![table("zeta", &[]), table("alpha", &[])]));
        let zeta = text.find("DROP TABLE IF EXISTS `zeta`;").unwrap();
        let alpha = text.find("DROP TABLE IF EXISTS `alpha`;").unwrap();
        assert!(zeta < alpha);
    }

    #[test]
    fn quotes_identifiers_at_render_time() {
        let mut doc = document(vec![table("od`d", &["('1')"])]);
        doc.database = "my db".to_string();
        let text = render(&doc);
        assert!(text.contains("DROP DATABASE IF EXISTS `my db`;"));
        assert!(text.contains("USE `my db`;"));
        assert!(text.contains("INSERT INTO `od``d` VALUES ('1');"));
        assert_eq!(doc.database, "my db");
    }

    #[test]
    fn rendering_is_repeatable() {
        let doc = document(vec![table("t", &["('1')", "('2')"])]);
        assert_eq!(render(&doc), render(&doc));
    }

    #[test]
    fn render_to_matches_render() {
        let doc = document(vec![table("t", &["('1')"])]);
        let mut out = String::new();
        render_to(&mut out, &doc).unwrap();
        assert_eq!(out, render(&doc));
    }
}
