mod common;

use anyhow::Result;
use predicates::prelude::*;

use common::*;

#[test]
fn test_annotate_missing_blast_file_is_usage_error() -> Result<()> {
    let env = TestEnvironment::new()?;
    let table = env.write_input("table.tsv", fixtures::sample_accession_table())?;

    metatax_cmd(&env)
        .arg("annotate")
        .arg("-f").arg(env.input_dir().join("missing.m8"))
        .arg("-g").arg(&table)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("is not an existing file"));
    Ok(())
}

#[test]
fn test_annotate_empty_blast_output() -> Result<()> {
    let env = TestEnvironment::new()?;
    let blast = env.write_input("hits.m8", "# BLASTN 2.15.0+\n\n")?;
    let table = env.write_input("table.tsv", fixtures::sample_accession_table())?;

    metatax_cmd(&env)
        .arg("annotate")
        .arg("-f").arg(&blast)
        .arg("-g").arg(&table)
        .arg("-r").arg(env.output_dir())
        .assert()
        .code(6)
        .stderr(predicate::str::contains("nothing read from"));
    Ok(())
}

#[test]
fn test_annotate_malformed_hit_line() -> Result<()> {
    let env = TestEnvironment::new()?;
    let blast = env.write_input("hits.m8", "contig_1\tgi|1|AB1.1|\t99.0\n")?;
    let table = env.write_input("table.tsv", fixtures::sample_accession_table())?;

    metatax_cmd(&env)
        .arg("annotate")
        .arg("-f").arg(&blast)
        .arg("-g").arg(&table)
        .arg("-r").arg(env.output_dir())
        .assert()
        .code(4)
        .stderr(predicate::str::contains("line 1"));
    Ok(())
}

#[test]
fn test_annotate_missing_config_file() -> Result<()> {
    let env = TestEnvironment::new()?;
    let blast = env.write_input("hits.m8", fixtures::sample_blast_output())?;
    let table = env.write_input("table.tsv", fixtures::sample_accession_table())?;

    metatax_cmd(&env)
        .arg("--config").arg(env.input_dir().join("nope.toml"))
        .arg("annotate")
        .arg("-f").arg(&blast)
        .arg("-g").arg(&table)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Error:"));
    Ok(())
}

#[test]
fn test_lineage_without_accessions() -> Result<()> {
    let env = TestEnvironment::new()?;
    let taxadb = TaxadbFixture::standard()?;
    let blast = env.write_input("hits.tsv", "# comment only\nq1 local_id 99.0\n")?;

    metatax_cmd(&env)
        .arg("lineage")
        .arg("-i").arg(&blast)
        .arg("-d").arg(taxadb.path())
        .arg("-o").arg(env.output_dir().join("out.tsv"))
        .assert()
        .code(6)
        .stderr(predicate::str::contains("No accession id read from"));
    Ok(())
}

#[test]
fn test_lineage_with_foreign_database() -> Result<()> {
    let env = TestEnvironment::new()?;
    let blast = env.write_input("hits.m8", fixtures::sample_blast_output())?;
    let not_a_db = env.write_input("taxadb.sqlite", "accession\ttaxid\n".repeat(100))?;

    metatax_cmd(&env)
        .arg("lineage")
        .arg("-i").arg(&blast)
        .arg("-d").arg(&not_a_db)
        .arg("-o").arg(env.output_dir().join("out.tsv"))
        .assert()
        .code(5);
    Ok(())
}

#[test]
fn test_split_requires_a_plan() -> Result<()> {
    let env = TestEnvironment::new()?;
    let input = env.write_input("reads.fasta", fixtures::sample_fasta(3))?;

    metatax_cmd(&env)
        .arg("split")
        .arg("-i").arg(&input)
        .assert()
        .code(2);

    metatax_cmd(&env)
        .arg("split")
        .arg("-i").arg(&input)
        .args(["-n", "2", "-m", "1"])
        .assert()
        .code(2);
    Ok(())
}

#[test]
fn test_split_zero_chunks_is_usage_error() -> Result<()> {
    let env = TestEnvironment::new()?;
    let input = env.write_input("reads.fasta", fixtures::sample_fasta(3))?;

    metatax_cmd(&env)
        .arg("split")
        .arg("-i").arg(&input)
        .args(["-n", "0"])
        .arg("-o").arg(env.output_dir())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid value"));

    assert!(env.output_files()?.is_empty());
    Ok(())
}

#[test]
fn test_split_non_positive_size_is_usage_error() -> Result<()> {
    let env = TestEnvironment::new()?;
    let input = env.write_input("reads.fasta", fixtures::sample_fasta(3))?;

    for size in ["0", "-1.5"] {
        metatax_cmd(&env)
            .arg("split")
            .arg("-i").arg(&input)
            .arg(format!("--max-file-size={}", size))
            .arg("-o").arg(env.output_dir())
            .assert()
            .code(2)
            .stderr(predicate::str::contains("positive number of gigabytes"));
    }

    assert!(env.output_files()?.is_empty());
    Ok(())
}
