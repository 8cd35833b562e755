use super::*;

#[test]
fn short_boundaries() {
    let s = generate("Taller X", "Quito", "…", DurationClass::Short);
    assert_eq!(s.boundaries(), vec![3, 20, 30, 38, 45]);
    assert_eq!(s.beats[2].start_s, 21);
}

#[test]
fn extended_boundaries() {
    let s = generate("Taller X", "Quito", "…", DurationClass::Extended);
    assert_eq!(s.boundaries(), vec![3, 40, 70, 100, 120]);
    assert_eq!(
        s.beats.iter().map(|b| b.start_s).collect::<Vec<_>>(),
        vec![0, 3, 41, 71, 101]
    );
}

#[test]
fn rendered_text_interpolates_and_echoes_theme() {
    let text = generate(
        "Taller X",
        "Quito",
        "DE OFICIO A MARCA",
        DurationClass::Short,
    )
    .to_string();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines[0],
        "HOOK (0–3s): Esto pasó HOY en Quito 🔥 Llegamos a Taller X, un negocio que no se rinde."
    );
    assert!(lines[1].starts_with("ACCIÓN (3–20s): "));
    assert!(lines[1].contains("\"Taller X 🔑 | Quito\""));
    assert!(lines[2].starts_with("PICO EMOCIONAL (21–30s): "));
    assert!(lines[3].starts_with("POST-PICO (31–38s): "));
    assert!(lines[4].starts_with("CIERRE (39–45s): "));
    assert_eq!(lines[5], "");
    assert_eq!(lines[6], "[Temática elegida: DE OFICIO A MARCA]");
    assert_eq!(lines.len(), 7);
}

#[test]
fn empty_inputs_still_produce_five_beats() {
    let s = generate("", "", "", DurationClass::Extended);
    assert_eq!(s.beats.len(), 5);
    assert!(s.to_string().ends_with("[Temática elegida: ]"));
}

#[test]
fn generation_is_deterministic() {
    let a = generate("A", "B", "C", DurationClass::Short);
    let b = generate("A", "B", "C", DurationClass::Short);
    assert_eq!(a, b);
}
