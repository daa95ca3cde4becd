use eliza::{Eliza, Options, ScriptError, TurnFlags};

fn replies(eliza: &mut Eliza, inputs: &[&str]) -> Vec<String> {
    inputs.iter().map(|input| eliza.respond_to(input)).collect()
}

#[test]
fn opening_of_the_1966_transcript() {
    let mut eliza = Eliza::doctor();
    let got = replies(
        &mut eliza,
        &[
            "Men are all alike.",
            "They're always bugging us about something or other.",
            "Well, my boyfriend made me come here.",
            "He says I'm depressed much of the time.",
        ],
    );
    assert_eq!(
        got,
        [
            "IN WHAT WAY\n",
            "CAN YOU THINK OF A SPECIFIC EXAMPLE\n",
            "YOUR BOYFRIEND MADE YOU COME HERE\n",
            "I AM SORRY TO HEAR YOU ARE DEPRESSED\n",
        ]
    );
}

#[test]
fn memory_is_recalled_when_nothing_matches() {
    let mut eliza = Eliza::doctor();
    eliza.respond_to("Well, my boyfriend made me come here.");

    assert_eq!(eliza.respond_to("xyzzy"), "LETS DISCUSS FURTHER WHY YOUR BOYFRIEND MADE YOU COME HERE\n");
    // The memory is spent; NONE takes over and cycles.
    assert_eq!(eliza.respond_to("xyzzy"), "I AM NOT SURE I UNDERSTAND YOU FULLY\n");
    assert_eq!(eliza.respond_to("xyzzy"), "PLEASE GO ON\n");
}

#[test]
fn reassemblies_rotate_and_equivalences_link() {
    let mut eliza = Eliza::doctor();
    assert_eq!(eliza.respond_to("computer"), "DO COMPUTERS WORRY YOU\n");
    assert_eq!(eliza.respond_to("computer"), "WHY DO YOU MENTION COMPUTERS\n");
    assert_eq!(eliza.respond_to("machines"), "WHAT DO YOU THINK MACHINES HAVE TO DO WITH YOUR PROBLEM\n");
}

#[test]
fn pronouns_are_swapped() {
    let mut eliza = Eliza::doctor();
    assert_eq!(eliza.respond_to("you're sad"), "WHAT MAKES YOU THINK I AM SAD\n");
    assert_eq!(eliza.respond_to("I need some help"), "WHAT WOULD IT MEAN TO YOU IF YOU GOT SOME HELP\n");
}

#[test]
fn reserved_words_in_input_are_plain_text() {
    let mut eliza = Eliza::doctor();
    assert_eq!(eliza.respond_to("I said NONE of it"), "YOU SAY YOU SAID NONE OF IT\n");
}

#[test]
fn verbose_turn_shows_the_link() {
    let mut eliza = Eliza::doctor();
    let res = eliza.respond_verbose("machines");
    assert_eq!(res.text, "DO COMPUTERS WORRY YOU\n");
    assert!(res.details.flags.contains(TurnFlags::KEYWORDS | TurnFlags::LINKED));
    assert_eq!(res.details.steps[0].keyword, "MACHINES");
    assert_eq!(res.details.steps[0].link.as_deref(), Some("COMPUTER"));
    assert_eq!(res.details.steps.last().map(|s| s.rule.as_str()), Some("COMPUTER"));
}

#[test]
fn verbose_turn_reports_memories() {
    let mut eliza = Eliza::doctor();
    let res = eliza.respond_verbose("my dog is lost");
    assert!(res.details.flags.contains(TurnFlags::MEMORIZED));
    assert_eq!(res.details.memorized.len(), 1);

    let res = eliza.respond_verbose("xyzzy");
    assert!(res.details.flags.contains(TurnFlags::RECALLED));
    assert!(res.details.memorized.is_empty());
    assert_eq!(res.text, "LETS DISCUSS FURTHER WHY YOUR DOG IS LOST\n");
}

#[test]
fn seeded_greetings_are_reproducible() {
    let options = Options { seed: Some(1966), ..Options::default() };
    let mut a = Eliza::doctor_with(options.clone());
    let mut b = Eliza::doctor_with(options);
    assert_eq!(a.greet(), b.greet());
    assert_eq!(a.greet(), "HOW DO YOU DO. PLEASE TELL ME YOUR PROBLEM\n");
}

#[test]
fn custom_scripts_drive_the_same_engine() {
    let script = "
        (HI THERE)
        START
        (CAT = FELINE DLIST(/ ANIMAL))
        (PET ((0 (/ANIMAL) 0) (TELL ME ABOUT THE 2)))
        (NONE ((0) (GO ON)))
        ()
    ";
    let mut eliza = Eliza::from_script(script).unwrap();
    assert_eq!(eliza.greet(), "HI THERE\n");
    assert_eq!(eliza.respond_to("my pet cat"), "TELL ME ABOUT THE FELINE\n");
    assert_eq!(eliza.respond_to("nothing here"), "GO ON\n");
}

#[test]
fn broken_scripts_are_rejected() {
    assert!(matches!(Eliza::from_script("(HI) (NONE ((0) (GO ON)))"), Err(ScriptError::MissingStart)));
    assert!(matches!(Eliza::from_script("START (SORRY ((0) (NO)))"), Err(ScriptError::MissingNoneRule)));
}

#[test]
fn an_empty_memory_falls_through_to_none() {
    let mut eliza = Eliza::from_script("(HI) START (MEMORY MY (0 MY 0 = 3)) (NONE ((0) (GO ON))) ()").unwrap();
    assert_eq!(eliza.respond_to("cat my"), "GO ON\n");
}
