//! # Demo dataset
//!
//! Three users, eight complaints and eleven comments, dated relative to the
//! moment of seeding. Ids are fixed so loading twice is a no-op.

use chrono::{DateTime, Duration, Utc};
use tracing::info;
use uuid::Uuid;

use domains::{
    Category, Comment, CommentStatus, Complaint, ComplaintRepo, ComplaintStatus, Result, User,
    UserRepo, UserSettings,
};

pub const DEMO_ADMIN_ID: Uuid = Uuid::from_u128(0x5eed_0000_0000_4000_8000_0000_0000_0001);
pub const DEMO_ADMIN_USERNAME: &str = "admin";
pub const DEMO_ADMIN_EMAIL: &str = "admin@denuncias.com";

const USER_IDS: [Uuid; 3] = [
    DEMO_ADMIN_ID,
    Uuid::from_u128(0x5eed_0000_0000_4000_8000_0000_0000_0002),
    Uuid::from_u128(0x5eed_0000_0000_4000_8000_0000_0000_0003),
];

const fn complaint_id(n: u128) -> Uuid {
    Uuid::from_u128(0x5eed_0000_0000_4000_8000_0001_0000_0000 + n)
}

const fn comment_id(n: u128) -> Uuid {
    Uuid::from_u128(0x5eed_0000_0000_4000_8000_0002_0000_0000 + n)
}

#[derive(Debug, Clone)]
pub struct DemoDataset {
    pub users: Vec<User>,
    pub complaints: Vec<Complaint>,
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub users: usize,
    pub complaints: usize,
    pub comments: usize,
}

/// The account the demo identity provider signs in as.
pub fn demo_admin(now: DateTime<Utc>) -> User {
    let mut user = User::new(DEMO_ADMIN_USERNAME, DEMO_ADMIN_EMAIL, now - Duration::days(7));
    user.id = DEMO_ADMIN_ID;
    user
}

fn user(index: usize, username: &str, email: &str, registered: DateTime<Utc>) -> User {
    User {
        id: USER_IDS[index],
        username: username.to_string(),
        email: email.to_string(),
        registered_at: registered,
        created_complaints: Vec::new(),
        liked_complaints: Vec::new(),
        comments: Vec::new(),
        settings: UserSettings::default(),
    }
}

// (title, description, category, age, likes, author)
type ComplaintRow = (&'static str, &'static str, Category, Duration, u32, usize);

fn complaint_rows() -> [ComplaintRow; 8] {
    [
        (
            "Semáforo dañado en intersección principal",
            "El semáforo de la intersección entre Avenida Central y Calle 5 ha estado intermitente por tres días. Esto está causando embotellamientos y situaciones peligrosas para peatones y conductores. Urgente reparación.",
            Category::Infrastructure,
            Duration::days(2),
            47,
            0,
        ),
        (
            "Falta de iluminación en parque municipal",
            "El parque Las Flores no tiene iluminación nocturna funcionando. Varias lámparas están fundidas y otras directamente no funcionan. Esto ha creado un ambiente inseguro durante las noches.",
            Category::Security,
            Duration::days(1),
            32,
            0,
        ),
        (
            "Contaminación auditiva por construcción",
            "La obra de construcción en la Calle 12 inicia trabajos a las 5:30 AM todos los días, incluyendo fines de semana. El ruido excesivo está afectando el descanso de toda la comunidad.",
            Category::Environment,
            Duration::hours(1),
            28,
            1,
        ),
        (
            "Falta de recolección de basura",
            "En el sector residencial Las Palmas no pasa el camión de basura desde hace una semana. Los desechos se están acumulando y generando malos olores.",
            Category::PublicServices,
            Duration::hours(2),
            19,
            2,
        ),
        (
            "Hueco peligroso en vía principal",
            "Hay un hueco profundo en la Avenida Norte, justo antes del puente. Ya han ocurrido varios accidentes menores y daños a vehículos. Necesita reparación urgente.",
            Category::Infrastructure,
            Duration::hours(6),
            15,
            2,
        ),
        (
            "Problema en el suministro de agua",
            "El barrio Los Almendros lleva 48 horas sin suministro de agua potable. No hay comunicación oficial sobre cuándo se restablecerá el servicio.",
            Category::PublicServices,
            Duration::hours(4),
            12,
            1,
        ),
        (
            "Vandalismo en parada de autobús",
            "La parada de autobús frente al centro comercial ha sido vandalizada repetidamente. Los cristales están rotos y hay grafitis ofensivos.",
            Category::Security,
            Duration::hours(8),
            8,
            0,
        ),
        (
            "Falta de señalización en zona escolar",
            "La zona escolar de la Escuela Primaria Central no tiene señalización adecuada. Los conductores no reducen la velocidad y ponen en riesgo a los niños.",
            Category::Education,
            Duration::hours(12),
            6,
            1,
        ),
    ]
}

// (complaint index, author, content, offset from the complaint's creation, likes)
type CommentRow = (usize, usize, &'static str, Duration, u32);

fn comment_rows() -> [CommentRow; 11] {
    [
        (0, 1, "Totalmente de acuerdo. He visto varios accidentes menores por esta situación.", Duration::hours(2), 8),
        (0, 2, "Ya reporté esto a la municipalidad hace una semana pero no han respondido.", Duration::hours(4), 5),
        (0, 0, "Deberíamos organizar una petición formal con todas las firmas de los vecinos.", Duration::hours(6), 12),
        (1, 2, "Mi esposa ya no se atreve a caminar por ahí en las noches. Es una situación muy preocupante.", Duration::hours(1), 6),
        (1, 1, "Conozco a un electricista que podría ayudar voluntariamente si la municipalidad da los materiales.", Duration::hours(3), 9),
        (2, 0, "Hay que verificar si tienen permisos para trabajar en esos horarios. Podría ser una violación.", Duration::minutes(30), 4),
        (3, 0, "Mismo problema en mi sector. Parece ser un problema generalizado.", Duration::minutes(15), 3),
        (3, 1, "Llamé a la empresa de aseo y dijeron que es por falta de personal. Muy mala excusa.", Duration::minutes(45), 7),
        (4, 1, "Pasé por ahí ayer y es realmente peligroso. Casi daño la llanta de mi carro.", Duration::hours(1), 2),
        (5, 0, "Esto es inaceptable. Deberíamos exigir una explicación y compensación.", Duration::hours(1), 5),
        (6, 2, "Propongo instalar cámaras de seguridad para identificar a los vándalos.", Duration::hours(1), 1),
    ]
}

// (user, complaint indices the user likes)
const LIKES: [(usize, &[usize]); 3] = [(0, &[2, 3]), (1, &[0, 1]), (2, &[0])];

pub fn demo_dataset(now: DateTime<Utc>) -> DemoDataset {
    let mut users = vec![
        demo_admin(now),
        user(1, "ciudadano_activo", "ciudadano@email.com", now - Duration::days(5)),
        user(2, "vecino_preocupado", "vecino@email.com", now - Duration::days(3)),
    ];

    let mut complaints: Vec<Complaint> = complaint_rows()
        .into_iter()
        .enumerate()
        .map(|(i, (title, description, category, age, likes, author))| {
            let id = complaint_id(i as u128 + 1);
            users[author].add_created(id);
            Complaint {
                id,
                title: title.to_string(),
                description: description.to_string(),
                category,
                created_at: now - age,
                author_id: USER_IDS[author],
                likes,
                liked_by: Vec::new(),
                comment_ids: Vec::new(),
                anonymous: true,
                status: ComplaintStatus::Active,
            }
        })
        .collect();

    for (u, liked) in LIKES {
        for &c in liked {
            complaints[c].liked_by.push(USER_IDS[u]);
            users[u].liked_complaints.push(complaints[c].id);
        }
    }

    let comments = comment_rows()
        .into_iter()
        .enumerate()
        .map(|(i, (target, author, content, offset, likes))| {
            let id = comment_id(i as u128 + 1);
            complaints[target].attach_comment(id);
            users[author].add_comment(id);
            Comment {
                id,
                complaint_id: complaints[target].id,
                author_id: USER_IDS[author],
                content: content.to_string(),
                created_at: complaints[target].created_at + offset,
                likes,
                replies: Vec::new(),
                parent_id: None,
                anonymous: true,
                status: CommentStatus::Active,
            }
        })
        .collect();

    DemoDataset {
        users,
        complaints,
        comments,
    }
}

/// Inserts whatever part of `dataset` is not stored yet.
pub async fn load(
    dataset: DemoDataset,
    complaints: &dyn ComplaintRepo,
    users: &dyn UserRepo,
) -> Result<SeedReport> {
    let mut report = SeedReport::default();

    for user in dataset.users {
        if users.get_user(user.id).await?.is_none() {
            users.insert_user(user).await?;
            report.users += 1;
        }
    }

    for complaint in dataset.complaints {
        if complaints.get_complaint(complaint.id).await?.is_none() {
            // comment ids are appended again as each comment is attached
            let mut fresh = complaint;
            fresh.comment_ids.clear();
            complaints.insert_complaint(fresh).await?;
            report.complaints += 1;
        }
    }

    for comment in dataset.comments {
        let existing = complaints.list_comments(comment.complaint_id).await?;
        if existing.iter().all(|c| c.id != comment.id) {
            complaints.attach_comment(comment).await?;
            report.comments += 1;
        }
    }

    info!(
        users = report.users,
        complaints = report.complaints,
        comments = report.comments,
        "demo data loaded"
    );
    Ok(report)
}
