//! `codex new` command - Write a record for an image

use console::style;
use miette::Result;
use serde_json::Number;
use std::str::FromStr;

use crate::cli::helpers::{open_project, split_csv_args};
use crate::cli::GlobalOpts;
use crate::core::catalog::Catalog;
use crate::core::identity::record_id_from_path;
use crate::core::loader::write_record;
use crate::core::SchemaVersion;
use crate::entities::character::{Character, Skill, Skills, DEFAULT_IMAGE_POSITION};
use crate::schema::registry::SchemaRegistry;
use crate::schema::validator::Validator;

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Image file name in the images directory (default: next image without a record)
    #[arg()]
    pub image: Option<String>,

    /// Character name
    #[arg(long, short = 'n')]
    pub name: String,

    /// Identity name (default: the character name)
    #[arg(long, short = 'i')]
    pub identity: Option<String>,

    /// Mark as the character's base identity
    #[arg(long = "default")]
    pub is_default: bool,

    /// Grade (rarity)
    #[arg(long, short = 'g', default_value_t = 1)]
    pub grade: u64,

    /// Release date (YYYY-MM-DD)
    #[arg(long, default_value = "")]
    pub release_date: String,

    /// CSS object-position for the portrait crop
    #[arg(long, default_value = DEFAULT_IMAGE_POSITION)]
    pub image_position: String,

    /// Keywords (repeatable or comma-separated)
    #[arg(long = "keyword", short = 'k')]
    pub keywords: Vec<String>,

    /// Affiliations (repeatable or comma-separated; default from config)
    #[arg(long = "affiliation", short = 'a')]
    pub affiliations: Vec<String>,

    /// Regular skill as TYPE:ATTRIBUTE, given exactly three times
    #[arg(long = "skill", num_args = 1)]
    pub skills: Vec<SkillArg>,

    /// Special skill as TYPE:ATTRIBUTE, up to three times
    #[arg(long = "special", num_args = 1)]
    pub specials: Vec<SkillArg>,

    /// Defense as TYPE:ATTRIBUTE
    #[arg(long)]
    pub defense: SkillArg,

    /// Overwrite an existing record
    #[arg(long)]
    pub force: bool,
}

/// `TYPE:ATTRIBUTE` pair from the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillArg(pub Skill);

impl FromStr for SkillArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (skill_type, attribute) = s
            .split_once(':')
            .ok_or_else(|| format!("expected TYPE:ATTRIBUTE, got '{}'", s))?;
        let (skill_type, attribute) = (skill_type.trim(), attribute.trim());
        if skill_type.is_empty() || attribute.is_empty() {
            return Err(format!("both TYPE and ATTRIBUTE are required in '{}'", s));
        }
        Ok(SkillArg(Skill::new(skill_type, attribute)))
    }
}

pub fn run(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let (project, config) = open_project(global)?;
    let catalog = Catalog::for_project(&project, &config);

    let image_name = match &args.image {
        Some(name) => name.clone(),
        None => {
            let pending = catalog
                .next_pending()
                .map_err(|e| miette::miette!("{}", e))?
                .ok_or_else(|| miette::miette!("Every image already has a record"))?;
            pending
                .path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .ok_or_else(|| miette::miette!("Invalid image path {}", pending.path.display()))?
        }
    };

    let image_path = catalog.images_dir().join(&image_name);
    if !image_path.is_file() {
        return Err(miette::miette!(
            "Image not found: {}",
            image_path.display()
        ));
    }
    let id = record_id_from_path(&image_path)
        .ok_or_else(|| miette::miette!("Cannot derive an id from {}", image_name))?;

    let record_path = catalog.record_path(&id);
    if record_path.exists() && !args.force {
        return Err(miette::miette!(
            "Record already exists: {} (use --force to overwrite)",
            record_path.display()
        ));
    }

    let skills = build_skills(&args.skills, &args.specials)?;

    let mut affiliation = split_csv_args(&args.affiliations);
    if affiliation.is_empty() {
        affiliation.push(config.default_affiliation());
    }

    let mut character = Character {
        id: id.clone(),
        character_name: args.name.trim().to_string(),
        identity_name: args
            .identity
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(args.name.trim())
            .to_string(),
        is_default: args.is_default,
        grade: Number::from(args.grade),
        release_date: args.release_date.trim().to_string(),
        image_position: args.image_position.clone(),
        keywords: split_csv_args(&args.keywords),
        skills,
        defense: args.defense.0.clone(),
        affiliation,
        image_url: format!("{}{}", config.image_url_prefix(), image_name),
    };
    character.dedup_keywords();

    let registry = SchemaRegistry::default();
    let validator = Validator::new(&registry);
    let value = serde_json::to_value(&character).map_err(|e| miette::miette!("{}", e))?;
    let result = validator
        .validate_value(&value, &format!("{}.json", id), SchemaVersion::current())
        .map_err(miette::Report::new)?;

    write_record(&record_path, &character)
        .map_err(|e| miette::miette!("Failed to write {}: {}", record_path.display(), e))?;
    tracing::info!(%id, "wrote record");

    println!(
        "{} Created {} {}",
        style("✓").green(),
        style(&id).cyan(),
        style(character.display_name()).bold()
    );
    if !global.quiet {
        println!("   {}", style(record_path.display()).dim());
    }
    for issue in &result.warnings {
        println!("   {} {}", style("!").yellow(), style(issue).yellow());
    }

    Ok(())
}

/// Assemble the skills block from `--skill` and `--special` values
fn build_skills(skills: &[SkillArg], specials: &[SkillArg]) -> Result<Skills> {
    let [skill1, skill2, skill3] = skills else {
        return Err(miette::miette!(
            "Exactly three --skill values are required, got {}",
            skills.len()
        ));
    };
    if specials.len() > 3 {
        return Err(miette::miette!(
            "At most three --special values are allowed, got {}",
            specials.len()
        ));
    }

    let special = |i: usize| specials.get(i).map(|s| s.0.clone());

    Ok(Skills {
        skill1: skill1.0.clone(),
        skill2: skill2.0.clone(),
        skill3: skill3.0.clone(),
        special1: special(0),
        special2: special(1),
        special3: special(2),
    })
}
