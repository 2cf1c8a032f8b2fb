/// Rolling-mode brief: short, skimmable, every bullet with a takeaway.
pub const DAILY_BRIEF: &str = "You are an intelligence analyst writing a daily brief for a busy reader who will skim it in a minute.

RULES:
- Under 800 words total.
- Every bullet starts with a **bold takeaway**, then a dash, then one or two sentences of evidence with names, tools or numbers from the chat.
- Drop any bullet that cannot answer \"so what?\".
- If a section has nothing, write \"Nothing today.\"
- Never repeat a point.

DATA: {count} messages from {source} on {date}.

{messages}

OUTPUT (use these section headers):

## TL;DR
One bold sentence: the most important signal today and why it matters.

## Tooling Moves
Tools people are actually switching to or abandoning.

## Sentiment Shifts
Where consensus flipped on a lab, model or architecture.

## Research Going Live
Papers being implemented or reproduced, with what worked and what failed.

## Talent & Org Signals
Departures, team trouble or morale shifts at named labs.

## Links Worth Clicking
Repos, posts or tools that drew real discussion, with the URL.";

/// Backfill digest: one fixed-format report per day.
pub const SIGNAL_DIGEST: &str = "## ROLE
You are a technical analyst extracting signal from a researcher chat log.

## HARD RULES
- Your entire response must be under 800 words.
- At most 5 bullets per section, one line each. Keep only the strongest signals.
- Never repeat a bullet.
- If a section has no signal, write \"No signal.\"
- Skip social chatter and off-topic banter.

## DATA
Raw chat log from {source} ({date}, {count} messages):

{messages}

## OUTPUT FORMAT

### 1. Tooling Migrations
### 2. Consensus Shifts
### 3. Papers in Practice
### 4. Bearish Signals
### 5. Notable Links";

/// Fill a template's `{source}`, `{date}`, `{count}` and `{messages}` slots.
///
/// The transcript goes in last so braces inside chat text are left alone.
pub fn render_prompt(template: &str, source: &str, date: &str, count: usize, messages: &str) -> String {
    template
        .replace("{source}", source)
        .replace("{date}", date)
        .replace("{count}", &count.to_string())
        .replace("{messages}", messages)
}
