//! Content and assembly order of "La Sécurité des Travailleurs".
//!
//! [`build_story`] appends every block in its fixed order: title page, the three numbered
//! sections (each but the last ending with a page break), the conclusion, the callout box and the
//! footer line.  [`generate_document`] renders the story and writes the PDF.

use std::fs;
use std::path::{Path, PathBuf};

use log::info;

use crate::builder::{PdfBuilder, RenderedPdf};
use crate::error::{PdfBuildError, Result};
use crate::model::{CalloutBox, Story};
use crate::outline::DocumentInfo;
use crate::style::StyleRole;

/// File name written by [`generate_document`].
pub const OUTPUT_FILENAME: &str = "La_Securite_des_Travailleurs.pdf";

/// Document title, also used for the PDF metadata.
pub const TITLE: &str = "La Sécurité des Travailleurs";

const TAGLINE: &str = "<i>Guide pratique pour un environnement de travail sûr et sain</i>";

const INTRODUCTION: &str = "La sécurité au travail est un enjeu majeur qui concerne chaque \
    employeur et chaque travailleur. Dans un monde professionnel en constante évolution, protéger \
    la santé et la sécurité des employés n'est pas seulement une obligation légale, mais aussi un \
    investissement dans la productivité et le bien-être collectif. Ce guide présente les principes \
    essentiels pour créer et maintenir un environnement de travail sécuritaire.";

const RISKS_HEADING: &str = "1. Les Risques Professionnels";

const RISKS_INTRO: &str = "Les risques professionnels sont présents dans tous les secteurs \
    d'activité. Leur identification et leur compréhension constituent la première étape vers un \
    environnement de travail sécurisé.";

const RISK_TYPES: &[&str] = &[
    "<b>• Risques physiques :</b> Chutes, glissades, collisions, exposition au bruit excessif, \
     vibrations, températures extrêmes.",
    "<b>• Risques chimiques :</b> Manipulation de produits toxiques, inhalation de vapeurs \
     dangereuses, contact avec des substances corrosives.",
    "<b>• Risques biologiques :</b> Exposition à des virus, bactéries, champignons dans certains \
     environnements de travail (hôpitaux, laboratoires).",
    "<b>• Risques ergonomiques :</b> Postures inadaptées, mouvements répétitifs, port de charges \
     lourdes causant des troubles musculosquelettiques.",
    "<b>• Risques psychosociaux :</b> Stress chronique, harcèlement, surcharge de travail, manque \
     de reconnaissance.",
];

const RISK_ASSESSMENT: &str = "<b>L'importance de l'évaluation des risques :</b><br/>\
    Chaque entreprise doit procéder à une évaluation régulière des risques présents sur ses lieux \
    de travail. Cette démarche permet d'identifier les dangers potentiels, d'analyser leur \
    probabilité d'occurrence et leur gravité, puis de mettre en place des mesures préventives \
    adaptées. Le document unique d'évaluation des risques professionnels (DUERP) est l'outil \
    central de cette démarche.";

const PREVENTION_HEADING: &str = "2. Les Mesures de Prévention";

const PREVENTION_INTRO: &str = "La prévention est la clé pour réduire les accidents du travail \
    et les maladies professionnelles. Elle repose sur des principes concrets et applicables à tous \
    les secteurs.";

const PREVENTION_PRINCIPLES: &[&str] = &[
    "<b>1. Éviter les risques :</b> Supprimer le danger à la source quand c'est possible.",
    "<b>2. Évaluer les risques :</b> Analyser ceux qui ne peuvent être évités.",
    "<b>3. Combattre les risques à la source :</b> Agir sur les causes plutôt que sur les \
     conséquences.",
    "<b>4. Adapter le travail à l'homme :</b> Concevoir les postes de travail en tenant compte des \
     capacités humaines.",
    "<b>5. Tenir compte de l'évolution technique :</b> Intégrer les innovations pour améliorer la \
     sécurité.",
    "<b>6. Remplacer ce qui est dangereux :</b> Substituer les produits ou procédés dangereux par \
     des alternatives plus sûres.",
    "<b>7. Planifier la prévention :</b> Intégrer la sécurité dans l'organisation du travail.",
    "<b>8. Prioriser les protections collectives :</b> Privilégier les mesures qui protègent tous \
     les travailleurs.",
    "<b>9. Former et informer :</b> Donner aux travailleurs les instructions appropriées.",
];

const PROTECTIVE_EQUIPMENT: &str = "<b>Équipements de protection :</b><br/>\
    Les équipements de protection individuelle (EPI) sont essentiels lorsque les risques ne \
    peuvent être éliminés par d'autres moyens. Casques, gants, lunettes de protection, chaussures \
    de sécurité, protections auditives et respiratoires doivent être adaptés aux risques \
    identifiés, entretenus régulièrement et portés systématiquement.";

const TRAINING: &str = "<b>Formation et sensibilisation :</b><br/>\
    La formation continue des employés est indispensable. Elle doit couvrir les procédures de \
    sécurité, l'utilisation correcte des équipements, les gestes de premiers secours et les \
    comportements à adopter en cas d'urgence. Des sessions de sensibilisation régulières \
    maintiennent la vigilance et renforcent la culture de sécurité.";

const ROLES_HEADING: &str = "3. Le Rôle de l'Entreprise et du Travailleur";

const ROLES_INTRO: &str = "La sécurité au travail est une responsabilité partagée. Employeurs et \
    employés ont chacun un rôle crucial à jouer pour créer et maintenir un environnement de \
    travail sûr.";

const EMPLOYER_DUTIES: &[&str] = &[
    "• <b>Obligation de sécurité :</b> L'employeur a une obligation légale de protéger la santé \
     physique et mentale de ses employés.",
    "• <b>Évaluation et prévention :</b> Mettre en place une démarche d'évaluation des risques et \
     des mesures de prévention appropriées.",
    "• <b>Formation :</b> Assurer la formation à la sécurité de tous les travailleurs, y compris \
     les nouveaux arrivants.",
    "• <b>Information :</b> Communiquer clairement sur les risques et les procédures de sécurité.",
    "• <b>Moyens matériels :</b> Fournir les équipements de protection et les outils de travail \
     adaptés.",
    "• <b>Organisation :</b> Planifier le travail de manière à limiter les risques et éviter la \
     surcharge.",
    "• <b>Consultation :</b> Impliquer les représentants du personnel et les travailleurs dans les \
     démarches de prévention.",
];

const WORKER_DUTIES: &[&str] = &[
    "• <b>Respecter les consignes :</b> Suivre les instructions de sécurité et les procédures \
     établies.",
    "• <b>Utiliser les équipements :</b> Porter et utiliser correctement les équipements de \
     protection fournis.",
    "• <b>Signaler les dangers :</b> Alerter immédiatement sur toute situation dangereuse ou \
     dysfonctionnement.",
    "• <b>Participer à la formation :</b> S'investir dans les sessions de formation et de \
     sensibilisation.",
    "• <b>Prendre soin de sa santé :</b> Veiller à sa propre sécurité et à celle de ses collègues.",
    "• <b>Droit d'alerte :</b> Exercer son droit de retrait en cas de danger grave et imminent.",
    "• <b>Contribuer à l'amélioration :</b> Proposer des idées pour améliorer la sécurité sur le \
     lieu de travail.",
];

const SAFETY_CULTURE: &str = "<b>Une culture de sécurité collective :</b><br/>\
    La sécurité ne peut être efficace que si elle est intégrée dans la culture de l'entreprise. \
    Cela implique une communication ouverte, une reconnaissance des efforts en matière de \
    sécurité, et une amélioration continue basée sur le retour d'expérience. Les comités de santé, \
    sécurité et conditions de travail (CSSCT) jouent un rôle clé dans cette dynamique \
    collaborative.";

const CONCLUSION_HEADING: &str = "<b>Conclusion</b>";

const CONCLUSION: &str = "La sécurité des travailleurs n'est pas une option, c'est une priorité \
    absolue. Chaque accident évité, chaque maladie professionnelle prévenue représente une vie \
    protégée, une famille préservée et une entreprise plus performante. En combinant vigilance, \
    formation, équipements adaptés et dialogue social, nous pouvons créer des environnements de \
    travail où chacun rentre chez soi en bonne santé.<br/><br/>\
    <b>Ensemble, faisons de la sécurité au travail une réalité quotidienne !</b><br/><br/>\
    Rappelons-nous que la sécurité commence par chacun d'entre nous. Un geste simple, une \
    attention particulière, un signalement à temps peuvent faire toute la différence. Investir \
    dans la sécurité, c'est investir dans l'humain, et c'est toujours un investissement rentable.";

/// Closing message shown in the callout box.
pub const CALLOUT: &str = "<b>Retenez ceci :</b> Un travailleur en sécurité est un travailleur \
    productif, épanoui et engagé. La sécurité n'est pas une contrainte, c'est une valeur qui \
    profite à tous !";

const CALLOUT_WIDTH_MM: f64 = 150.0;
const CALLOUT_PADDING_PT: f64 = 15.0;

/// Copyright line closing the document.
pub const FOOTER: &str = "<i>Document éducatif - La Sécurité des Travailleurs © 2025</i>";

fn title_page(story: &mut Story) -> Result<()> {
    story.spacer_cm(1.0).text(StyleRole::Title, TITLE)?;
    story.spacer_cm(0.3).text(StyleRole::Tagline, TAGLINE)?;
    story.spacer_cm(1.0).text(StyleRole::Body, INTRODUCTION)?;
    // The trailing half centimetre keeps the slot of the former illustration.
    story.spacer_cm(1.0).spacer_cm(0.5).page_break();
    Ok(())
}

fn section_opening(story: &mut Story, heading: &str, intro: &str) -> Result<()> {
    story.text(StyleRole::Heading, heading)?;
    story.spacer_cm(0.3).text(StyleRole::Body, intro)?;
    story.spacer_cm(0.5);
    Ok(())
}

fn labelled_list(story: &mut Story, label: &str, items: &[&str]) -> Result<()> {
    story.text(StyleRole::Body, label)?;
    story.spacer_cm(0.2).list(items.iter().copied())?;
    story.spacer_cm(0.5);
    Ok(())
}

fn risks_section(story: &mut Story) -> Result<()> {
    section_opening(story, RISKS_HEADING, RISKS_INTRO)?;
    labelled_list(
        story,
        "<b>Les principaux types de risques :</b>",
        RISK_TYPES,
    )?;
    story.text(StyleRole::Body, RISK_ASSESSMENT)?;
    story.spacer_cm(0.8).spacer_cm(0.3).page_break();
    Ok(())
}

fn prevention_section(story: &mut Story) -> Result<()> {
    section_opening(story, PREVENTION_HEADING, PREVENTION_INTRO)?;
    labelled_list(
        story,
        "<b>Les principes généraux de prévention :</b>",
        PREVENTION_PRINCIPLES,
    )?;
    story.text(StyleRole::Body, PROTECTIVE_EQUIPMENT)?;
    story.spacer_cm(0.5).text(StyleRole::Body, TRAINING)?;
    story.spacer_cm(0.8).page_break();
    Ok(())
}

fn roles_section(story: &mut Story) -> Result<()> {
    section_opening(story, ROLES_HEADING, ROLES_INTRO)?;
    labelled_list(
        story,
        "<b>Les responsabilités de l'employeur :</b>",
        EMPLOYER_DUTIES,
    )?;
    labelled_list(
        story,
        "<b>Les responsabilités du travailleur :</b>",
        WORKER_DUTIES,
    )?;
    story.text(StyleRole::Body, SAFETY_CULTURE)?;
    story.spacer_cm(1.0);
    Ok(())
}

fn closing(story: &mut Story) -> Result<()> {
    story.text(StyleRole::Heading, CONCLUSION_HEADING)?;
    story.spacer_cm(0.3).text(StyleRole::Conclusion, CONCLUSION)?;
    story.spacer_cm(0.5).callout(CalloutBox::from_markup(
        CALLOUT,
        CALLOUT_WIDTH_MM,
        CALLOUT_PADDING_PT,
    )?);
    story.spacer_cm(1.0).text(StyleRole::Footer, FOOTER)?;
    Ok(())
}

/// Assembles the complete story in document order.
pub fn build_story() -> Result<Story> {
    let mut story = Story::new();
    title_page(&mut story)?;
    risks_section(&mut story)?;
    prevention_section(&mut story)?;
    roles_section(&mut story)?;
    closing(&mut story)?;
    Ok(story)
}

/// Descriptive metadata written into the PDF.
pub fn document_info() -> DocumentInfo {
    DocumentInfo {
        title: Some(TITLE.to_owned()),
        author: Some("Guide Éducatif".to_owned()),
        subject: Some("Sécurité au travail".to_owned()),
        keywords: Some("sécurité, travail, prévention, risques professionnels".to_owned()),
    }
}

/// Options accepted by [`generate_document_to`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GenerateOptions {
    /// Add section bookmarks and descriptive metadata.
    pub outline: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self { outline: true }
    }
}

/// Renders the brochure in memory.
pub fn render_brochure(options: GenerateOptions) -> Result<RenderedPdf> {
    PdfBuilder::new(build_story()?)
        .with_title(TITLE)
        .with_info(document_info())
        .with_outline(options.outline)
        .render()
}

/// Renders the brochure and writes it to `path`, returning the path on success.
pub fn generate_document_to(path: impl AsRef<Path>, options: GenerateOptions) -> Result<PathBuf> {
    let path = path.as_ref().to_path_buf();
    let pdf = render_brochure(options)?;
    fs::write(&path, &pdf.bytes).map_err(|source| PdfBuildError::Io {
        path: path.clone(),
        source,
    })?;
    info!(
        "Wrote {} ({} pages, {} bytes)",
        path.display(),
        pdf.page_count,
        pdf.bytes.len()
    );
    Ok(path)
}

/// Writes the brochure to [`OUTPUT_FILENAME`] in the current directory.
pub fn generate_document() -> Result<PathBuf> {
    generate_document_to(OUTPUT_FILENAME, GenerateOptions::default())
}
