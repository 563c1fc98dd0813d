//! Shared fixtures for engine integration tests

#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use rusqlite::Connection;

/// Darwin-Core style catalogue with a parent hierarchy
pub fn catalogue() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE taxon (
            taxonID TEXT PRIMARY KEY,
            scientificName TEXT,
            scientificNameAuthorship TEXT,
            taxonomicStatus TEXT,
            taxonRank TEXT,
            acceptedNameUsageID TEXT,
            parentNameUsageID TEXT,
            kingdom TEXT,
            genus TEXT,
            specificEpithet TEXT,
            infraspecificEpithet TEXT
        );
        INSERT INTO taxon VALUES
            ('1', 'Animalia', NULL, 'accepted', 'kingdom', NULL, NULL, 'Animalia', NULL, NULL, NULL),
            ('2', 'Chordata', NULL, 'accepted', 'phylum', NULL, '1', 'Animalia', NULL, NULL, NULL),
            ('3', 'Mobulidae', NULL, 'accepted', 'family', NULL, '2', 'Animalia', NULL, NULL, NULL),
            ('4', 'Mobula', NULL, 'accepted', 'genus', NULL, '3', 'Animalia', 'Mobula', NULL, NULL),
            ('5', 'Mobula alfredi', '(Krefft, 1868)', 'accepted', 'species', NULL, '4', 'Animalia', 'Mobula', 'alfredi', NULL),
            ('6', 'Manta alfredi', 'Krefft, 1868', 'synonym', 'species', '5', '4', 'Animalia', 'Manta', 'alfredi', NULL),
            ('7', 'Manta ehrenbergii', NULL, 'synonym', 'species', 'missing-id', NULL, 'Animalia', 'Manta', 'ehrenbergii', NULL),
            ('8', 'Panthera leo', 'Linnaeus, 1758', 'synonym', 'species', NULL, NULL, 'Animalia', 'Panthera', 'leo', NULL),
            ('9', 'Panthera leo persica', 'Meyer, 1826', 'accepted', 'subspecies', NULL, NULL, 'Animalia', 'Panthera', 'leo', 'persica'),
            ('10', 'Cycle one', NULL, 'accepted', 'genus', NULL, '11', NULL, NULL, NULL, NULL),
            ('11', 'Cycle two', NULL, 'accepted', 'family', NULL, '10', NULL, NULL, NULL, NULL);",
    )
    .unwrap();
    conn
}

/// Conservation-assessment export with its own column names and no hierarchy
pub fn assessments() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE assessments (
            internalTaxonId INTEGER,
            scientificName TEXT,
            authority TEXT,
            kingdomName TEXT,
            phylumName TEXT,
            familyName TEXT,
            genusName TEXT,
            speciesName TEXT,
            infraName TEXT,
            taxonRank TEXT
        );
        INSERT INTO assessments VALUES
            (101, 'Mobula alfredi', '( Krefft,1868)', 'ANIMALIA', 'CHORDATA', 'MOBULIDAE', 'Mobula', 'alfredi', NULL, 'species'),
            (102, 'Manta alfredi', 'Krefft 1868', 'ANIMALIA', 'CHORDATA', 'MOBULIDAE', 'Manta', 'alfredi', NULL, 'species'),
            (103, 'Panthera leo persica', 'Meyer, 1826', 'ANIMALIA', 'CHORDATA', 'FELIDAE', 'Panthera', 'leo', 'persica', 'subspecies'),
            (104, 'Mobula thurstoni', NULL, 'ANIMALIA', 'CHORDATA', 'MOBULIDAE', 'Mobula', 'thurstoni', NULL, 'species'),
            (105, '', NULL, 'ANIMALIA', NULL, NULL, NULL, NULL, NULL, NULL);",
    )
    .unwrap();
    conn
}

/// A linear chain `depth` levels deep, ids "n0" (root) .. "n{depth-1}"
pub fn deep_chain(depth: usize) -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch("CREATE TABLE taxon (taxonID TEXT, scientificName TEXT, parentNameUsageID TEXT);")
        .unwrap();
    for level in 0..depth {
        let parent = level.checked_sub(1).map(|p| format!("n{p}"));
        conn.execute(
            "INSERT INTO taxon VALUES (?1, ?2, ?3)",
            rusqlite::params![format!("n{level}"), format!("Node {level}"), parent],
        )
        .unwrap();
    }
    conn
}
