/// Builds the deterministic first-turn advice prompt.
///
/// Caller name and age are optional; the opening line degrades to the
/// parts that were supplied.
pub fn first_turn(
    caller_name: Option<&str>,
    partner_name: &str,
    caller_age: Option<u32>,
    concern: &str,
) -> String {
    let intro = match (caller_name, caller_age) {
        (Some(name), Some(age)) => format!("My name is {name}, and I'm {age} years old. "),
        (Some(name), None) => format!("My name is {name}. "),
        (None, Some(age)) => format!("I'm {age} years old. "),
        (None, None) => String::new(),
    };

    format!(
        "{intro}I'm having an issue with my partner, {partner_name}. The problem is: {concern}. \n\n\
         I'm looking for advice on how to address this situation. What steps can I take to improve things? \
         Are there any communication strategies or perspectives I should consider? \
         How can I approach this sensitively while also addressing my own needs?\n\n\
         Any insights or suggestions would be greatly appreciated. I want to handle this in a way \
         that's respectful to both of us and strengthens our relationship."
    )
}
