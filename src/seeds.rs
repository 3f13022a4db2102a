//! Built-in challenge content: the three bundled 30-day categories.
//!
//! Each table lists the task titles of every day, in order. Task ids are assigned
//! sequentially per category (1, 2, 3, ...) in declaration order.

use crate::domain::{Category, CategorySource, ChallengeDay, Task};

const FITNESS_DAYS: &[&[&str]] = &[
  &["10 sentadillas", "10 flexiones de brazos", "1 min estiramiento de piernas"],
  &["15 sentadillas", "15 abdominales"],
  &["20 saltos", "10 burpees", "1 min plancha"],
  &["20 saltos"],
  &["12 sentadillas"],
  &["10 abdominales"],
  &["Camina 10 minutos"],
  &["18 flexiones de pared"],
  &["45 segundos de plancha"],
  &["25 saltos"],
  &["15 sentadillas"],
  &["15 abdominales"],
  &["Estiramiento 5 min"],
  &["20 flexiones de pared"],
  &["1 minuto de plancha"],
  &["30 saltos"],
  &["18 sentadillas"],
  &["20 abdominales"],
  &["Camina 15 minutos"],
  &["25 flexiones de pared"],
  &["1:15 min plancha"],
  &["35 saltos"],
  &["20 sentadillas"],
  &["25 abdominales"],
  &["Estiramiento 8 min"],
  &["30 flexiones de pared"],
  &["1:30 min plancha"],
  &["40 saltos"],
  &["25 sentadillas"],
  &["30 abdominales"],
];

const MENTAL_HEALTH_DAYS: &[&[&str]] = &[
  &["Medita 2 minutos", "Escribe 1 cosa positiva de tu día"],
  &["3 cosas por las que estás agradecido", "Respira profundo 5 veces"],
  &["Medita 3 minutos", "Dibuja algo que te relaje"],
  &["Llama a un amigo"],
  &["Escribe tus emociones"],
  &["Camina sin teléfono"],
  &["Medita 4 minutos"],
  &["Practica autocompasión"],
  &["Visualiza tu día ideal"],
  &["Medita 5 minutos"],
  &["Expresa gratitud a alguien"],
  &["Desconéctate 1 hora"],
  &["Medita 6 minutos"],
  &["Haz algo que amas"],
  &["Escribe 3 logros"],
  &["Medita 7 minutos"],
  &["Practica la escucha activa"],
  &["Observa la naturaleza"],
  &["Medita 8 minutos"],
  &["Perdónate por algo"],
  &["Haz un acto de bondad"],
  &["Medita 9 minutos"],
  &["Reflexiona sobre tu crecimiento"],
  &["Desconéctate completamente"],
  &["Medita 10 minutos"],
  &["Escribe una carta a tu yo futuro"],
  &["Celebra tus progresos"],
  &["Medita 12 minutos"],
  &["Planifica tu bienestar futuro"],
  &["Escribe un diario de gratitud"],
];

const PRODUCTIVITY_DAYS: &[&[&str]] = &[
  &["Lista de 3 tareas", "Organiza tu escritorio"],
  &["Pomodoro de 25 minutos", "Revisa tus objetivos"],
  &["Elimina una distracción", "Planifica la semana", "Aprende algo nuevo 15 min"],
  &["Delega una tarea"],
  &["3 Pomodoros"],
  &["Organiza archivos digitales"],
  &["Define prioridades"],
  &["Aprende 20 minutos"],
  &["Elimina notificaciones"],
  &["4 Pomodoros"],
  &["Crea un sistema"],
  &["Lee sobre productividad"],
  &["Evalúa tus herramientas"],
  &["Aprende 25 minutos"],
  &["Planifica objetivos trimestrales"],
  &["5 Pomodoros"],
  &["Optimiza una rutina"],
  &["Networking 30 min"],
  &["Aprende 30 minutos"],
  &["Revisa y ajusta metas"],
  &["Crea un plan de acción"],
  &["6 Pomodoros"],
  &["Comparte tu progreso"],
  &["Planifica el siguiente mes"],
  &["Revisa tus logros"],
  &["Establece nuevas metas"],
  &["Organiza un espacio de trabajo"],
  &["Investiga sobre productividad"],
  &["Reflexiona sobre tu mes"],
  &["Ajusta tu plan de acción"],
];

/// Categories that ship with the app and are always present in the catalog.
pub fn seed_categories() -> Vec<Category> {
  vec![
    build("fitness", "Fitness", "dumbbell", ["#ff6b6b", "#ee5a52"], FITNESS_DAYS),
    build("mental-health", "Salud Mental", "brain", ["#4c9aff", "#3182ce"], MENTAL_HEALTH_DAYS),
    build("productivity", "Productividad", "target", ["#10b981", "#059669"], PRODUCTIVITY_DAYS),
  ]
}

fn build(id: &str, name: &str, icon: &str, gradient: [&str; 2], table: &[&[&str]]) -> Category {
  let mut next_id = 1u32;
  let days = table
    .iter()
    .zip(1u32..)
    .map(|(titles, day)| ChallengeDay {
      day,
      tasks: titles
        .iter()
        .map(|title| {
          let task = Task { id: next_id, title: (*title).to_string(), description: None };
          next_id += 1;
          task
        })
        .collect(),
    })
    .collect();

  Category {
    id: id.to_string(),
    name: name.to_string(),
    icon: icon.to_string(),
    color: gradient[0].to_string(),
    gradient_colors: [gradient[0].to_string(), gradient[1].to_string()],
    source: CategorySource::Bundled,
    days,
  }
}
