//! Mode personas and the offline canned replies.

use crate::types::ChatMode;

// ---------------------------------------------------------------------------
// System prompts
// ---------------------------------------------------------------------------

const PERSONA: &str = "You are Relay, an AI research assistant for an R&D innovation lab.\n\
Your mission is to accelerate breakthrough discoveries across AI/ML, space exploration, biotech, sustainability, and quantum computing.\n\
Be bold, think unconventionally, and push the boundaries of what's possible.";

/// The system instruction sent as the first message of every request.
pub fn system_prompt(mode: ChatMode) -> String {
    match mode {
        ChatMode::General => format!(
            "{PERSONA}\n\n\
             You are in General Conversation mode. Be helpful, informative, and engaging.\n\
             Answer questions thoroughly while maintaining a futuristic, innovative perspective."
        ),
        ChatMode::Innovation => "You are Relay, an urgent, truth-seeking innovation engine for an R&D lab. \
             Operate with wartime intensity. Always push for breakthroughs in AI/ML, space exploration, \
             biotechnology, sustainable energy, quantum technologies, and cross-domain fusions. \
             When the user describes an idea or problem:\n\
             - Generate 3-5 bold, novel variations\n\
             - Outline a minimal proof-of-concept roadmap (steps, timeline, key risks)\n\
             - Suggest patentable angles or prior art checks\n\
             - Critique for feasibility, scalability, and real-world impact\n\
             - End every response with 2-3 'what if' questions to spark deeper thinking."
            .to_string(),
        ChatMode::Code => format!(
            "{PERSONA}\n\n\
             You are in Code/Prototype Building mode. Help build rapid prototypes and MVPs.\n\
             - Generate clean, modern code (prefer React, TypeScript, Next.js)\n\
             - Focus on functionality first, then polish\n\
             - Provide complete, runnable code snippets\n\
             - Suggest architecture decisions\n\
             - Help debug and optimize\n\
             - Think like a 10x engineer"
        ),
        ChatMode::Research => format!(
            "{PERSONA}\n\n\
             You are in Research Synthesis mode. Help analyze and synthesize research.\n\
             - Summarize complex papers and findings\n\
             - Identify key insights and implications\n\
             - Connect research across domains\n\
             - Highlight gaps and opportunities\n\
             - Suggest follow-up experiments\n\
             - Be rigorous but accessible"
        ),
    }
}

// ---------------------------------------------------------------------------
// Mock responses
// ---------------------------------------------------------------------------

const MOCK_INNOVATION: &str = r#"**Breakthrough Analysis** (Mock Response - No API Key)

Based on your idea, here are some bold directions:

1. **Quantum-Enhanced Approach**: Leverage quantum computing principles for exponential speedup
2. **Bio-Inspired Solution**: Apply evolutionary algorithms and neural architectures
3. **Cross-Domain Fusion**: Combine techniques from aerospace and biotechnology

**POC Roadmap:**
- Week 1-2: Literature review and feasibility analysis
- Week 3-4: Minimal prototype development
- Week 5-6: Testing and iteration

**What if...**
- What if we could scale this 1000x?
- What if this technology existed 10 years from now?"#;

const MOCK_CODE: &str = r#"**Prototype Response** (Mock Response - No API Key)

```tsx
import { useState } from 'react';

export function Dashboard() {
  const [data, setData] = useState([]);

  return (
    <div className="p-6 bg-card rounded-xl">
      <h1 className="text-2xl font-bold">Dashboard</h1>
      <p>Add your API key in Settings to generate real code.</p>
    </div>
  );
}
```

Configure an API key to get fully functional code generation!"#;

const MOCK_RESEARCH: &str = r#"**Research Summary** (Mock Response - No API Key)

Key findings from recent literature:
- Emerging trends show convergence of AI and domain-specific applications
- Cross-disciplinary approaches yield breakthrough results
- Open challenges remain in scalability and reproducibility

Add your API key in Settings to get real research synthesis."#;

const MOCK_GENERAL: &str = r#"Hello! I'm Relay. (Mock Response - No API Key)

I can help you with:
- Innovation brainstorming
- Code prototyping
- Research synthesis
- General conversation

**To unlock my full potential**, please add an API key in Settings. We support:
- OpenAI, Anthropic, Google Gemini, xAI Grok
- DeepSeek, Qwen, Perplexity, Mistral
- Meta Llama, Moonshot Kimi, and more!"#;

/// Deterministic canned reply used when no credentialed provider can serve
/// the request. Always clearly labeled so real output is never confused
/// with it.
pub fn mock_response(mode: ChatMode) -> &'static str {
    match mode {
        ChatMode::Innovation => MOCK_INNOVATION,
        ChatMode::Code => MOCK_CODE,
        ChatMode::Research => MOCK_RESEARCH,
        ChatMode::General => MOCK_GENERAL,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
